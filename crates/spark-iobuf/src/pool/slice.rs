use std::sync::Arc;

use spin::Mutex;

use super::{PoolMetrics, PoolStats};
use crate::config::SlicePoolConfig;

/// 尺寸分级的数量：第 `k` 级保存容量至少为 `2^k` 的切片。
const NUM_CLASSES: usize = 32;

/// 超过该尺寸的请求绕过池，直接向分配器申请。
const MAX_POOLED_SIZE: usize = i32::MAX as usize;

/// `SlicePool` 描述“按尺寸租借 / 归还定长字节切片”的能力。
///
/// # 契约定义（What）
/// - `acquire(size)`：返回 `len() == size`、`capacity() >= size` 的 `Vec<u8>`；
///   其中的字节内容未定义（可能残留上一位租户的数据），调用方应先写后读；
/// - `release(buf)`：把切片交还池复用；实现必须容忍任意容量，
///   包括非 2 的幂或零容量的切片。
pub trait SlicePool {
    fn acquire(&self, size: usize) -> Vec<u8>;

    fn release(&self, buf: Vec<u8>);
}

impl<P: SlicePool + ?Sized> SlicePool for &P {
    fn acquire(&self, size: usize) -> Vec<u8> {
        (**self).acquire(size)
    }

    fn release(&self, buf: Vec<u8>) {
        (**self).release(buf)
    }
}

impl<P: SlicePool + ?Sized> SlicePool for Arc<P> {
    fn acquire(&self, size: usize) -> Vec<u8> {
        (**self).acquire(size)
    }

    fn release(&self, buf: Vec<u8>) {
        (**self).release(buf)
    }
}

/// `SizeClassPool` 按 2 的幂尺寸分级复用 `Vec<u8>`。
///
/// # 核心机制（How）
/// - 32 个分级各自持有一把 `spin::Mutex<Vec<Vec<u8>>>`，不同尺寸的租借互不竞争；
/// - 未命中时按分级上限分配（请求 1000 字节得到容量 1024 的切片），
///   使同一分级内的切片可以互换；
/// - 归还时按容量定级：容量恰为 `2^k` 归入第 `k` 级，否则归入更低一级，
///   从而保证“第 `k` 级的切片容量至少为 `2^k`”。
///
/// - 归还时按 [`SlicePoolConfig`] 限制留存：容量超过上限或所在分级已满的切片直接释放，
///   并记入 `discarded`；[`shrink_to_fit`](Self::shrink_to_fit) 可一次清空全部缓存。
///
/// # 设计权衡（Trade-offs）
/// - 复用的切片不清零，省去一次 `memset`；池的使用者都是“先写后读”的缓冲。
/// - 超过 `i32::MAX` 的请求不入池。
#[derive(Debug)]
pub struct SizeClassPool {
    classes: [Mutex<Vec<Vec<u8>>>; NUM_CLASSES],
    config: SlicePoolConfig,
    metrics: PoolMetrics,
}

impl Default for SizeClassPool {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeClassPool {
    pub const fn new() -> Self {
        Self::with_config(SlicePoolConfig::DEFAULT)
    }

    pub const fn with_config(config: SlicePoolConfig) -> Self {
        Self {
            classes: [const { Mutex::new(Vec::new()) }; NUM_CLASSES],
            config,
            metrics: PoolMetrics::new(),
        }
    }

    pub fn config(&self) -> &SlicePoolConfig {
        &self.config
    }

    pub fn stats(&self) -> PoolStats {
        self.metrics.snapshot()
    }

    /// 当前各分级缓存的切片总数。
    pub fn idle_slices(&self) -> usize {
        self.classes.iter().map(|class| class.lock().len()).sum()
    }

    /// 清空所有分级，返回释放的总容量。
    pub fn shrink_to_fit(&self) -> usize {
        let mut released = 0;
        for class in &self.classes {
            let mut list = class.lock();
            released += list.iter().map(Vec::capacity).sum::<usize>();
            list.clear();
        }
        released
    }
}

impl SlicePool for SizeClassPool {
    fn acquire(&self, size: usize) -> Vec<u8> {
        if size == 0 {
            return Vec::new();
        }
        if size > MAX_POOLED_SIZE {
            self.metrics.record_miss();
            return vec![0; size];
        }

        let idx = class_index(size);
        let reused = self.classes[idx].lock().pop();
        match reused {
            Some(mut buf) => {
                self.metrics.record_hit();
                if buf.len() >= size {
                    buf.truncate(size);
                } else {
                    buf.resize(size, 0);
                }
                buf
            }
            None => {
                self.metrics.record_miss();
                tracing::trace!(size, class = idx, "slice pool miss");
                let mut buf = Vec::with_capacity(1 << idx);
                buf.resize(size, 0);
                buf
            }
        }
    }

    fn release(&self, buf: Vec<u8>) {
        let capacity = buf.capacity();
        if capacity == 0 {
            return;
        }
        let limit = self.config.max_retained_capacity().min(MAX_POOLED_SIZE);
        if capacity > limit {
            self.metrics.record_discard();
            tracing::debug!(capacity, limit, "slice pool drops oversized slice");
            return;
        }

        let mut idx = class_index(capacity);
        if capacity != 1 << idx {
            idx -= 1;
        }
        let mut list = self.classes[idx].lock();
        if list.len() >= self.config.max_idle_per_class() {
            drop(list);
            self.metrics.record_discard();
            return;
        }
        list.push(buf);
        drop(list);
        self.metrics.record_recycle();
    }
}

/// 返回容纳 `n` 字节所需的分级下标，即 `ceil(log2(n))`；`n` 必须大于 0。
fn class_index(n: usize) -> usize {
    (usize::BITS - (n - 1).leading_zeros()) as usize
}

static GLOBAL_SLICE_POOL: SizeClassPool = SizeClassPool::new();

/// 进程级 [`SizeClassPool`] 的零大小句柄。
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalSlicePool;

impl GlobalSlicePool {
    pub fn stats(&self) -> PoolStats {
        GLOBAL_SLICE_POOL.stats()
    }
}

impl SlicePool for GlobalSlicePool {
    fn acquire(&self, size: usize) -> Vec<u8> {
        GLOBAL_SLICE_POOL.acquire(size)
    }

    fn release(&self, buf: Vec<u8>) {
        GLOBAL_SLICE_POOL.release(buf)
    }
}
