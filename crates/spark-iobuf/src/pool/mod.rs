//! 环形缓冲与分块链表依赖的两类池化分配器。
//!
//! # 模块角色（Why）
//! - [`SlicePool`]：按 2 的幂尺寸分级复用定长 `Vec<u8>`，为环形缓冲扩容提供存储；
//! - [`ChunkPool`]：复用可增长的 [`BytesMut`](bytes::BytesMut)，作为分块链表的节点载荷。
//!
//! # 核心机制（How）
//! - 两个默认实现都以 `spin::Mutex` 保护自由链表，以原子计数记录命中、未命中、
//!   回收与丢弃次数，[`PoolStats`] 是这些计数的快照；
//! - [`GlobalSlicePool`] / [`GlobalChunkPool`] 是指向进程级静态池的零大小句柄，
//!   作为核心类型的默认类型参数；测试可注入任意实现了 trait 的桩。

mod chunk;
mod slice;

use core::sync::atomic::{AtomicUsize, Ordering};

pub use chunk::{ChunkBufferPool, ChunkPool, GlobalChunkPool};
pub use slice::{GlobalSlicePool, SizeClassPool, SlicePool};

/// 池计数的只读快照。
///
/// - `hits`：租借时命中自由链表的次数；
/// - `misses`：租借时重新分配的次数；
/// - `recycled`：归还后被留存复用的次数；
/// - `discarded`：归还时因尺寸或数量限制被直接释放的次数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub hits: usize,
    pub misses: usize,
    pub recycled: usize,
    pub discarded: usize,
}

#[derive(Debug, Default)]
struct PoolMetrics {
    hits: AtomicUsize,
    misses: AtomicUsize,
    recycled: AtomicUsize,
    discarded: AtomicUsize,
}

impl PoolMetrics {
    const fn new() -> Self {
        Self {
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            recycled: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
        }
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_recycle(&self) {
        self.recycled.fetch_add(1, Ordering::Relaxed);
    }

    fn record_discard(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> PoolStats {
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            recycled: self.recycled.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}
