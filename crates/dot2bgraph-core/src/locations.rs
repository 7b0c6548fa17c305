//! The Locations container and its public output shape. Field names in
//! [`LocationsOutput`] are normative for downstream consumers.

use std::collections::BTreeMap;

use dot2bgraph_error::{Error, Result};
use serde::Serialize;

use crate::arena::ArenaId;
use crate::declare_id;

declare_id!(BlockId);
declare_id!(EdgeEndId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up = 1,
    Right = 2,
    Down = 3,
    Left = 4,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub depth: u32,
    pub color: u32,
    pub label: Option<String>,
    pub edge_ends: Vec<EdgeEndId>,
}

#[derive(Debug, Clone)]
pub struct EdgeEnd {
    pub x: i64,
    pub y: i64,
    pub color: u32,
    pub direction: Direction,
    pub is_source: bool,
    pub block: Option<BlockId>,
    pub peers: Vec<EdgeEndId>,
    pub label: Option<String>,
}

/// A write-mostly, dense-id store of [`Block`]s and [`EdgeEnd`]s. IDs are
/// never reused after deletion; `BTreeMap` keeps both stores iterable in
/// ascending-id order without a separate sort step.
pub struct Locations {
    bg_color: u32,
    highlight_bg_color: u32,
    highlight_fg_color: u32,
    blocks: BTreeMap<u32, Block>,
    edge_ends: BTreeMap<u32, EdgeEnd>,
    next_block_id: u32,
    next_edge_end_id: u32,
}

impl Locations {
    pub fn new(bg_color: u32, highlight_bg_color: u32, highlight_fg_color: u32) -> Self {
        Self {
            bg_color,
            highlight_bg_color,
            highlight_fg_color,
            blocks: BTreeMap::new(),
            edge_ends: BTreeMap::new(),
            next_block_id: 0,
            next_edge_end_id: 0,
        }
    }

    pub fn add_block(
        &mut self,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        depth: u32,
        color: u32,
        label: Option<String>,
    ) -> BlockId {
        let id = self.next_block_id;
        self.next_block_id += 1;
        self.blocks
            .insert(id, Block { x, y, width, height, depth, color, label, edge_ends: Vec::new() });
        BlockId::from_index(id as usize)
    }

    pub fn add_edge_end(
        &mut self,
        x: i64,
        y: i64,
        color: u32,
        direction: Direction,
        is_source: bool,
        block: Option<BlockId>,
        label: Option<String>,
    ) -> EdgeEndId {
        let id = self.next_edge_end_id;
        self.next_edge_end_id += 1;
        self.edge_ends.insert(
            id,
            EdgeEnd { x, y, color, direction, is_source, block, peers: Vec::new(), label },
        );
        let ee_id = EdgeEndId::from_index(id as usize);
        if let Some(block_id) = block {
            self.block_mut(block_id).edge_ends.push(ee_id);
        }
        ee_id
    }

    pub fn assign_edge_to_block(&mut self, edge_end: EdgeEndId, block: BlockId) {
        if let Some(previous) = self.edge_end(edge_end).block {
            self.block_mut(previous).edge_ends.retain(|&id| id != edge_end);
        }
        self.edge_end_mut(edge_end).block = Some(block);
        self.block_mut(block).edge_ends.push(edge_end);
    }

    /// Cross-links `src` and `dst` as one directed edge. Marks `src` as the
    /// source; `dst` must not already be marked as a source.
    pub fn add_edge(&mut self, src: EdgeEndId, dst: EdgeEndId) -> Result<()> {
        if self.edge_end(dst).is_source {
            return Err(Error::invariant_violation(
                "edge destination is already marked as a source EdgeEnd",
            )
            .with_operation("locations::add_edge"));
        }
        self.edge_end_mut(src).is_source = true;
        self.edge_end_mut(src).peers.push(dst);
        self.edge_end_mut(dst).peers.push(src);
        Ok(())
    }

    /// Removes a block, unbinding (but not deleting) every EdgeEnd bound to
    /// it.
    pub fn del_block(&mut self, id: BlockId) {
        if let Some(block) = self.blocks.remove(&(id.as_u32())) {
            for ee in block.edge_ends {
                if let Some(ee) = self.edge_ends.get_mut(&ee.as_u32()) {
                    ee.block = None;
                }
            }
        }
    }

    /// Removes an EdgeEnd, unbinding it from its block and from every peer.
    pub fn del_edge_end(&mut self, id: EdgeEndId) {
        if let Some(ee) = self.edge_ends.remove(&id.as_u32()) {
            if let Some(block) = ee.block {
                if let Some(block) = self.blocks.get_mut(&block.as_u32()) {
                    block.edge_ends.retain(|&other| other != id);
                }
            }
            for peer in ee.peers {
                if let Some(peer) = self.edge_ends.get_mut(&peer.as_u32()) {
                    peer.peers.retain(|&other| other != id);
                }
            }
        }
    }

    pub fn del_edge(&mut self, src: EdgeEndId, dst: EdgeEndId) {
        self.edge_end_mut(src).peers.retain(|&id| id != dst);
        self.edge_end_mut(dst).peers.retain(|&id| id != src);
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().map(|(&id, b)| (BlockId::from_index(id as usize), b))
    }

    pub fn edge_ends(&self) -> impl Iterator<Item = (EdgeEndId, &EdgeEnd)> {
        self.edge_ends.iter().map(|(&id, e)| (EdgeEndId::from_index(id as usize), e))
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[&id.as_u32()]
    }

    pub fn edge_end(&self, id: EdgeEndId) -> &EdgeEnd {
        &self.edge_ends[&id.as_u32()]
    }

    fn block_mut(&mut self, id: BlockId) -> &mut Block {
        self.blocks.get_mut(&id.as_u32()).expect("BlockId is valid")
    }

    fn edge_end_mut(&mut self, id: EdgeEndId) -> &mut EdgeEnd {
        self.edge_ends.get_mut(&id.as_u32()).expect("EdgeEndId is valid")
    }

    /// Maximum extent over every Block and EdgeEnd.
    pub fn width(&self) -> i64 {
        let blocks_max = self.blocks.values().map(|b| b.x + b.width).max().unwrap_or(0);
        let ends_max = self.edge_ends.values().map(|e| e.x + 1).max().unwrap_or(0);
        blocks_max.max(ends_max).max(1)
    }

    pub fn height(&self) -> i64 {
        let blocks_max = self.blocks.values().map(|b| b.y + b.height).max().unwrap_or(0);
        let ends_max = self.edge_ends.values().map(|e| e.y + 1).max().unwrap_or(0);
        blocks_max.max(ends_max).max(1)
    }

    pub fn to_output(&self) -> LocationsOutput {
        LocationsOutput {
            width: self.width(),
            height: self.height(),
            bg_color: self.bg_color,
            highlight_bg_color: self.highlight_bg_color,
            highlight_fg_color: self.highlight_fg_color,
            blocks: self
                .blocks()
                .map(|(id, b)| BlockOutput {
                    id: id.as_u32(),
                    x: b.x,
                    y: b.y,
                    width: b.width,
                    height: b.height,
                    depth: b.depth,
                    color: b.color,
                    edge_ends: b.edge_ends.iter().map(|id| id.as_u32()).collect(),
                    label: b.label.clone(),
                })
                .collect(),
            edge_ends: self
                .edge_ends()
                .map(|(id, e)| EdgeEndOutput {
                    id: id.as_u32(),
                    x: e.x,
                    y: e.y,
                    color: e.color,
                    direction: e.direction as u8,
                    is_source: e.is_source,
                    block: e.block.map(|b| b.as_u32()),
                    edge_ends: e.peers.iter().map(|id| id.as_u32()).collect(),
                    label: e.label.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlockOutput {
    pub id: u32,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub depth: u32,
    pub color: u32,
    #[serde(rename = "edgeEnds")]
    pub edge_ends: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeEndOutput {
    pub id: u32,
    pub x: i64,
    pub y: i64,
    pub color: u32,
    pub direction: u8,
    #[serde(rename = "isSource")]
    pub is_source: bool,
    pub block: Option<u32>,
    #[serde(rename = "edgeEnds")]
    pub edge_ends: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocationsOutput {
    pub width: i64,
    pub height: i64,
    #[serde(rename = "bgColor")]
    pub bg_color: u32,
    #[serde(rename = "highlightBgColor")]
    pub highlight_bg_color: u32,
    #[serde(rename = "highlightFgColor")]
    pub highlight_fg_color: u32,
    pub blocks: Vec<BlockOutput>,
    #[serde(rename = "edgeEnds")]
    pub edge_ends: Vec<EdgeEndOutput>,
}
