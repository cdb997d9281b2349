//! `pool_contract` 集成测试：验证两类池在真实调用路径下的复用与统计。
//!
//! # 测试目标（Why）
//! - 切片池的“尺寸分级”与块池的“保留上限”决定了热路径是否真的免于分配，
//!   统计字段一旦失真，线上只能靠内存曲线猜测池的命中情况；
//! - 核心类型通过 trait 注入池，这里同时验证 `Arc` 共享句柄的用法。

use std::sync::Arc;

use spark_iobuf::{
    ChunkBufferPool, ChunkList, ChunkPool, ChunkPoolConfig, GlobalChunkPool, GlobalSlicePool,
    PoolStats, RingBuffer, SizeClassPool, SlicePool, SlicePoolConfig,
};

/// 扩容后的旧存储回到切片池，下一次同尺寸扩容直接命中。
#[test]
fn ring_growth_recycles_storage_through_shared_pool() {
    let pool = Arc::new(SizeClassPool::new());
    {
        let mut ring = RingBuffer::with_pool(4, pool.clone());
        ring.write(&[0; 6]);
        assert_eq!(ring.cap(), 8);
    }
    let after_first = pool.stats();
    assert_eq!(after_first.misses, 2, "首次构造与首次扩容都需要新分配");
    assert_eq!(after_first.recycled, 2, "扩容替换的存储与析构的存储都应回池");

    let mut ring = RingBuffer::with_pool(4, pool.clone());
    ring.write(&[0; 6]);
    let after_second = pool.stats();
    assert_eq!(after_second.hits, 2);
    assert_eq!(after_second.misses, 2);
}

/// 大量扩容后的缓冲同时析构，切片池只保留配置允许的数量，其余直接释放。
#[test]
fn dropped_rings_leave_bounded_idle_slices() {
    let config = SlicePoolConfig::default()
        .with_max_idle_per_class(4)
        .with_max_retained_capacity(1 << 20);
    let pool = Arc::new(SizeClassPool::with_config(config));

    let rings: Vec<_> = (0..8)
        .map(|_| {
            let mut ring = RingBuffer::with_pool(0, pool.clone());
            ring.write(&vec![0u8; 64 * 1024]);
            ring
        })
        .collect();
    drop(rings);
    assert_eq!(pool.idle_slices(), 4);
    assert_eq!(pool.stats().discarded, 4);

    let mut huge = RingBuffer::with_pool(0, pool.clone());
    huge.write(&vec![0u8; 2 << 20]);
    drop(huge);
    assert_eq!(pool.idle_slices(), 4, "超过留存上限的存储不应入池");
    assert_eq!(pool.stats().discarded, 5);

    assert_eq!(pool.shrink_to_fit(), 4 * 64 * 1024);
    assert_eq!(pool.idle_slices(), 0);
}

/// 切片池返回的切片长度等于请求，容量覆盖整个分级。
#[test]
fn slice_pool_honours_length_and_class_capacity() {
    let pool = SizeClassPool::new();
    for size in [1usize, 2, 3, 100, 4096, 5000] {
        let buf = pool.acquire(size);
        assert_eq!(buf.len(), size);
        assert!(buf.capacity() >= size.next_power_of_two());
        pool.release(buf);
    }
    assert_eq!(pool.stats().recycled, 6);
}

/// 复用的切片被裁剪或扩展到请求长度。
#[test]
fn reused_slice_is_resized_to_request() {
    let pool = SizeClassPool::new();
    let mut buf = pool.acquire(16);
    buf.truncate(3);
    pool.release(buf);

    let grown = pool.acquire(10);
    assert_eq!(grown.len(), 10);
    pool.release(grown);
    let shrunk = pool.acquire(9);
    assert_eq!(shrunk.len(), 9);
}

/// 块池按配置拒绝保留过大的缓冲。
#[test]
fn chunk_pool_applies_retention_limits() {
    let config = ChunkPoolConfig::default()
        .with_initial_capacity(8)
        .with_max_retained_capacity(128)
        .with_max_idle_buffers(4);
    let pool = ChunkBufferPool::with_config(config);
    assert_eq!(pool.config().initial_capacity(), 8);

    {
        let mut list = ChunkList::with_pool(&pool);
        list.push_bytes_back(&[1; 16]);
        list.push_bytes_back(&[2; 512]);
    }
    let stats = pool.stats();
    assert_eq!(stats.recycled, 1);
    assert_eq!(stats.discarded, 1);
    assert_eq!(pool.idle_buffers(), 1);
}

/// 进程级句柄可以直接作为默认池使用。
#[test]
fn global_handles_are_usable() {
    let before = GlobalSlicePool.stats();
    let buf = GlobalSlicePool.acquire(32);
    assert_eq!(buf.len(), 32);
    GlobalSlicePool.release(buf);
    let after = GlobalSlicePool.stats();
    assert!(after.recycled > before.recycled);

    let chunk = GlobalChunkPool.acquire();
    assert!(chunk.is_empty());
    GlobalChunkPool.release(chunk);
    assert_ne!(GlobalChunkPool.stats(), PoolStats::default());
}
