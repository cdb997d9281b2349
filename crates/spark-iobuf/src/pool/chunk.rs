use std::sync::Arc;

use bytes::BytesMut;
use spin::Mutex;

use super::{PoolMetrics, PoolStats};
use crate::config::ChunkPoolConfig;

/// `ChunkPool` 描述“租借 / 归还可增长缓冲”的能力。
///
/// # 契约定义（What）
/// - `acquire()`：返回一个空的（`len() == 0`）、可追加写入、由调用方独占的 `BytesMut`；
/// - `release(buf)`：把缓冲交还池；池可以选择留存复用或直接释放，调用方不应再假设其内容。
pub trait ChunkPool {
    fn acquire(&self) -> BytesMut;

    fn release(&self, buf: BytesMut);
}

impl<P: ChunkPool + ?Sized> ChunkPool for &P {
    fn acquire(&self) -> BytesMut {
        (**self).acquire()
    }

    fn release(&self, buf: BytesMut) {
        (**self).release(buf)
    }
}

impl<P: ChunkPool + ?Sized> ChunkPool for Arc<P> {
    fn acquire(&self) -> BytesMut {
        (**self).acquire()
    }

    fn release(&self, buf: BytesMut) {
        (**self).release(buf)
    }
}

/// `ChunkBufferPool` 基于自由链表复用 `BytesMut`。
///
/// # 核心机制（How）
/// - `spin::Mutex<Vec<BytesMut>>` 作为自由链表，租借时弹出最近归还的缓冲（LIFO，缓存更热）；
/// - 归还时先 `clear()`，再按 [`ChunkPoolConfig`] 的上限决定留存或释放：
///   容量过大的缓冲与超出空闲数量上限的缓冲都会被直接丢弃，并记入 `discarded`。
///
/// # 设计权衡（Trade-offs）
/// - 不按尺寸分级：分块链表的节点通常是单次写入的负载，尺寸分布集中，
///   单条链表足以覆盖；大包由 `max_retained_capacity` 拦截，不会长期占用内存。
#[derive(Debug)]
pub struct ChunkBufferPool {
    free_list: Mutex<Vec<BytesMut>>,
    config: ChunkPoolConfig,
    metrics: PoolMetrics,
}

impl Default for ChunkBufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkBufferPool {
    pub const fn new() -> Self {
        Self::with_config(ChunkPoolConfig::DEFAULT)
    }

    pub const fn with_config(config: ChunkPoolConfig) -> Self {
        Self {
            free_list: Mutex::new(Vec::new()),
            config,
            metrics: PoolMetrics::new(),
        }
    }

    pub fn config(&self) -> &ChunkPoolConfig {
        &self.config
    }

    pub fn stats(&self) -> PoolStats {
        self.metrics.snapshot()
    }

    /// 自由链表中等待复用的缓冲数量。
    pub fn idle_buffers(&self) -> usize {
        self.free_list.lock().len()
    }

    /// 清空自由链表，返回释放的总容量。
    pub fn shrink_to_fit(&self) -> usize {
        let mut list = self.free_list.lock();
        let released = list.iter().map(BytesMut::capacity).sum();
        list.clear();
        released
    }
}

impl ChunkPool for ChunkBufferPool {
    fn acquire(&self) -> BytesMut {
        let reused = self.free_list.lock().pop();
        match reused {
            Some(buf) => {
                self.metrics.record_hit();
                buf
            }
            None => {
                self.metrics.record_miss();
                BytesMut::with_capacity(self.config.initial_capacity())
            }
        }
    }

    fn release(&self, mut buf: BytesMut) {
        buf.clear();
        let capacity = buf.capacity();
        if capacity > self.config.max_retained_capacity() {
            self.metrics.record_discard();
            tracing::debug!(
                capacity,
                limit = self.config.max_retained_capacity(),
                "chunk pool drops oversized buffer"
            );
            return;
        }

        let mut list = self.free_list.lock();
        if list.len() >= self.config.max_idle_buffers() {
            drop(list);
            self.metrics.record_discard();
            return;
        }
        list.push(buf);
        drop(list);
        self.metrics.record_recycle();
    }
}

static GLOBAL_CHUNK_POOL: ChunkBufferPool = ChunkBufferPool::new();

/// 进程级 [`ChunkBufferPool`] 的零大小句柄。
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalChunkPool;

impl GlobalChunkPool {
    pub fn stats(&self) -> PoolStats {
        GLOBAL_CHUNK_POOL.stats()
    }
}

impl ChunkPool for GlobalChunkPool {
    fn acquire(&self) -> BytesMut {
        GLOBAL_CHUNK_POOL.acquire()
    }

    fn release(&self, buf: BytesMut) {
        GLOBAL_CHUNK_POOL.release(buf)
    }
}
