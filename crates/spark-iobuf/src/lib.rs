//! `spark-iobuf` 提供网络 I/O 层之下的字节缓冲原语。
//!
//! # 模块定位（Why）
//! - 传输层在读写热路径上需要暂存字节：读侧等待协议解码、写侧等待 socket 可写。
//!   若每次都重新分配或把多段数据拼成一块，分配与拷贝会直接吞掉吞吐。
//! - 本 crate 只关心“字节如何被暂存与移交”，不实现任何协议，也不内置同步；
//!   每条连接通常独占一个缓冲，由调用方自行串行化访问（必要时配合 [`SpinLock`]）。
//!
//! # 设计概要（How）
//! - [`RingBuffer`]：读写游标独立的环形缓冲，`r == w` 的歧义由显式的空标记消解，
//!   容量不足时按倍增 / 25% 递增策略扩容，存储来自 [`SlicePool`]。
//! - [`ChunkList`]：由池化 [`bytes::BytesMut`] 组成的有序分块序列，支持两端压入、
//!   头部弹出以及按字节粒度的零拷贝丢弃，用于聚合多段待写数据做向量化写出。
//! - `pool`、`math`、`byteconv`、`sync` 是两者依赖的叶子协作者，均以 trait 或独立函数暴露，
//!   便于测试中替换为内存桩实现。
//!
//! # 命名约定（Consistency）
//! - 读写语义延续 `std::io` 与 `bytes::Buf` 的术语；两种缓冲均实现对应 trait，
//!   上层可以直接把它们交给通用的 I/O 组合子。

pub mod byteconv;
pub mod chunk_list;
pub mod config;
pub mod error;
pub mod math;
pub mod pool;
pub mod ring;
pub mod sync;

pub use chunk_list::{Chunk, ChunkList};
pub use config::{
    BUFFER_GROW_THRESHOLD, ChunkPoolConfig, DEFAULT_BUFFER_SIZE, RingBufferConfig, SlicePoolConfig,
};
pub use error::BufferError;
pub use pool::{
    ChunkBufferPool, ChunkPool, GlobalChunkPool, GlobalSlicePool, PoolStats, SizeClassPool,
    SlicePool,
};
pub use ring::RingBuffer;
pub use sync::{SpinLock, SpinLockGuard};
