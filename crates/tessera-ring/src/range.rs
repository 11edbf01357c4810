//! 环形区间运算。
//!
//! # 设计背景（Why）
//! - 路由层需要判断分区键落在哪个节点负责的区间、合并相邻区间、把大区间切分给并行扫描；
//! - 哈希环首尾相接，区间可能跨越环的起点，线性比较无法直接套用。
//!
//! # 契约说明（What）
//! - 区间为左开右闭的顺时针弧 `]start, end]`；
//! - `start == end` 表示整个环，而不是空区间；
//! - 区间的两个端点必须属于同一哈希空间。
//!
//! # 结构说明（How）
//! - 包含判定依赖显式的“跨越环起点”标志（`start > end`）；
//! - 合并依赖闭区间弧上的成员判定 [`in_closed_arc`]，按“起点是否落在对方弧上”分情形处理。

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, RingError};
use crate::factory::TokenFactory;
use crate::token::Token;

/// 哈希环上的左开右闭区间。
#[derive(Clone)]
pub struct TokenRange {
    start: Token,
    end: Token,
    factory: Arc<dyn TokenFactory>,
}

impl TokenRange {
    /// 构造区间；两个端点都必须属于 `factory` 的哈希空间。
    pub fn new(start: Token, end: Token, factory: Arc<dyn TokenFactory>) -> Result<Self> {
        for token in [&start, &end] {
            let min = factory.min_token();
            if !token.same_space(&min) {
                return Err(RingError::IncompatibleTokens {
                    left: min.kind(),
                    right: token.kind(),
                });
            }
            if !factory.owns(token) {
                return Err(RingError::InvalidToken {
                    partitioner: token.kind(),
                    text: token.to_string(),
                    reason: format!("not owned by {}", factory.name()),
                });
            }
        }
        Ok(Self {
            start,
            end,
            factory,
        })
    }

    /// 起点（不含）。
    pub fn start(&self) -> &Token {
        &self.start
    }

    /// 终点（含）。
    pub fn end(&self) -> &Token {
        &self.end
    }

    pub fn factory(&self) -> &Arc<dyn TokenFactory> {
        &self.factory
    }

    /// 是否覆盖整个环。
    pub fn is_full_ring(&self) -> bool {
        self.start == self.end
    }

    /// 是否跨越环的起点；终点恰为最小哨兵的区间不算跨越。
    pub fn is_wrapped_around(&self) -> bool {
        self.start > self.end && self.end != self.factory.min_token()
    }

    /// 顺时针从 `start`（不含）出发，能否在 `end`（含）之前到达 `token`。
    ///
    /// 整个环包含一切 Token；其他哈希空间的 Token 永远不被包含。
    pub fn contains(&self, token: &Token) -> bool {
        if !token.same_space(&self.start) {
            return false;
        }
        if self.is_full_ring() {
            return true;
        }
        if self.start > self.end {
            *token > self.start || *token <= self.end
        } else {
            *token > self.start && *token <= self.end
        }
    }

    /// 两个区间是否至少共享一个 Token。
    ///
    /// 只有端点相接（一方终点即另一方起点）不算相交。
    ///
    /// `start == end` 的区间表示整个环，因此与任意区间相交，包括另一个整环以及它自身：
    /// `]3, 3]` 与 `]3, 9]` 相交，`]3, 3]` 与 `]3, 3]` 也相交。
    /// 调用方若把这种区间当作空区间看待，需要先用 [`TokenRange::is_full_ring`] 自行排除。
    pub fn intersects(&self, other: &TokenRange) -> Result<bool> {
        self.ensure_same_space(other)?;
        Ok(self.contains(&other.end) || other.contains(&self.end))
    }

    /// 返回覆盖两个区间并集的最小连续区间。
    ///
    /// - 一方包含另一方时返回较大者；
    /// - 相交或首尾相接时，从位于对方之外的起点延伸到位于本方之外的终点；
    /// - 两段弧合起来闭合成环，或两者既不相交也不相接时，返回以 `self.start` 为锚点的整个环。
    pub fn merge_with(&self, other: &TokenRange) -> Result<TokenRange> {
        self.ensure_same_space(other)?;

        if self.is_full_ring() {
            return Ok(self.clone());
        }
        if other.is_full_ring() {
            return Ok(other.clone());
        }
        if self.contains_range(other) {
            return Ok(self.clone());
        }
        if other.contains_range(self) {
            return Ok(other.clone());
        }

        let chained = self.end == other.start || other.end == self.start;
        if !chained && !self.intersects(other)? {
            debug!(left = %self, right = %other, "merging disjoint ranges yields the full ring");
            return Ok(self.with_bounds(self.start.clone(), self.start.clone()));
        }

        let other_start_in_self = in_closed_arc(&self.start, &self.end, &other.start);
        let self_start_in_other = in_closed_arc(&other.start, &other.end, &self.start);
        let merged = match (other_start_in_self, self_start_in_other) {
            (true, true) => self.with_bounds(self.start.clone(), self.start.clone()),
            (true, false) => self.with_bounds(self.start.clone(), other.end.clone()),
            (false, _) => self.with_bounds(other.start.clone(), self.end.clone()),
        };
        Ok(merged)
    }

    /// 在最小哨兵处拆开跨越环起点的区间。
    ///
    /// 跨越时返回 `]start, min]` 与 `]min, end]`；否则返回自身。
    pub fn unwrap(&self) -> Vec<TokenRange> {
        if !self.is_wrapped_around() {
            return vec![self.clone()];
        }
        let min = self.factory.min_token();
        vec![
            self.with_bounds(self.start.clone(), min.clone()),
            self.with_bounds(min, self.end.clone()),
        ]
    }

    /// 切分为 `parts` 个首尾相接、恰好覆盖本区间的子区间。
    pub fn split_evenly(&self, parts: usize) -> Result<Vec<TokenRange>> {
        let boundaries = self.factory.split(&self.start, &self.end, parts)?;
        let mut points = Vec::with_capacity(boundaries.len() + 2);
        points.push(self.start.clone());
        points.extend(boundaries);
        points.push(self.end.clone());
        Ok(points
            .windows(2)
            .map(|pair| self.with_bounds(pair[0].clone(), pair[1].clone()))
            .collect())
    }

    fn with_bounds(&self, start: Token, end: Token) -> TokenRange {
        TokenRange {
            start,
            end,
            factory: Arc::clone(&self.factory),
        }
    }

    /// `other` 整体落在本区间的闭弧上：起点在 `[start, end]` 内，终点在 `[other.start, end]` 内。
    fn contains_range(&self, other: &TokenRange) -> bool {
        in_closed_arc(&self.start, &self.end, &other.start)
            && in_closed_arc(&other.start, &self.end, &other.end)
    }

    fn ensure_same_space(&self, other: &TokenRange) -> Result<()> {
        if self.start.same_space(&other.start) {
            Ok(())
        } else {
            Err(RingError::IncompatibleTokens {
                left: self.start.kind(),
                right: other.start.kind(),
            })
        }
    }
}

/// 顺时针闭弧 `[start, end]` 是否包含 `token`。
fn in_closed_arc(start: &Token, end: &Token, token: &Token) -> bool {
    if start <= end {
        start <= token && token <= end
    } else {
        token >= start || token <= end
    }
}

impl PartialEq for TokenRange {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl Eq for TokenRange {}

impl Hash for TokenRange {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.end.hash(state);
    }
}

impl fmt::Display for TokenRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "]{}, {}]", self.start, self.end)
    }
}

impl fmt::Debug for TokenRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRange")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("factory", &self.factory.name())
            .finish()
    }
}
