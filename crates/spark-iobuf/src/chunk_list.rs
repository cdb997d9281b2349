//! 池化字节块组成的有序链表，用于聚合待写数据。
//!
//! # 模块定位（Why）
//! - 上层一次 flush 往往要写出多段互不相邻的负载（报文头、多个业务帧）；
//!   把它们拼成一块连续内存会多付一次拷贝，`ChunkList` 则保持各段独立，
//!   写出时以向量化 I/O 一次交给内核。
//! - 内核只写出了一部分时，[`ChunkList::discard_bytes`] 按字节粒度从头部丢弃，
//!   被写了一半的块在原地切掉前缀，不做拷贝。
//!
//! # 结构设计（How）
//! - 节点以 `VecDeque<Chunk>` 顺序持有，两端压入与头部弹出都是 O(1)；
//!   节点数即 `VecDeque` 的长度，总字节数 `bytes` 随每次修改同步更新。
//! - 块载荷是 [`BytesMut`]，取自 [`ChunkPool`]，被丢弃或重置时归还；`pop` 则把所有权交给调用方。
//!
//! # 视图契约（What）
//! - `peek_bytes_list*` 返回借用链表的字节视图，借用期间无法对链表做任何修改，
//!   “下一次修改即失效”由借用检查在编译期保证；
//! - 需要复用同一块视图内存的调用方可使用 [`ChunkList::peek_bytes_list_into`]，
//!   或通过 [`Buf::chunks_vectored`] 填充自备的 `IoSlice` 数组。

use core::{fmt, ops::Deref};
use std::{collections::VecDeque, io::IoSlice};

use bytes::{Buf, BufMut, BytesMut};

use crate::pool::{ChunkPool, GlobalChunkPool};

/// 链表节点：独占一个池化缓冲。
#[derive(Debug, Default)]
pub struct Chunk {
    buf: BytesMut,
}

impl Chunk {
    pub fn new(buf: BytesMut) -> Self {
        Self { buf }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// 取回底层缓冲的所有权。
    pub fn into_inner(self) -> BytesMut {
        self.buf
    }
}

impl From<BytesMut> for Chunk {
    fn from(buf: BytesMut) -> Self {
        Self::new(buf)
    }
}

impl Deref for Chunk {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

/// 池化字节块的有序链表。
///
/// # 契约说明（What）
/// - [`len`](Self::len) 恒等于链表中的块数，[`bytes`](Self::bytes) 恒等于各块长度之和；
/// - 链表中的块总是非空：空块在压入时即被回收，部分丢弃只切掉前缀而不会切空，
///   因此 `Buf::chunk` 只在 `remaining() == 0` 时为空；
/// - 所有操作对任意输入都有定义：空切片、`0` 字节丢弃、空链表弹出均为无副作用的空操作；
/// - `Drop` 时等价于 [`reset`](Self::reset)，全部块归还块池。
///
/// # 并发（Trade-offs）
/// - 与 [`RingBuffer`](crate::RingBuffer) 相同，不做内部同步，由调用方串行化访问。
pub struct ChunkList<P: ChunkPool = GlobalChunkPool> {
    chunks: VecDeque<Chunk>,
    bytes: usize,
    pool: P,
}

impl ChunkList {
    /// 使用进程级块池创建空链表。
    pub fn new() -> Self {
        Self::with_pool(GlobalChunkPool)
    }
}

impl Default for ChunkList {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ChunkPool> ChunkList<P> {
    pub fn with_pool(pool: P) -> Self {
        Self {
            chunks: VecDeque::new(),
            bytes: 0,
            pool,
        }
    }

    /// 在头部插入一个块；空块直接归还块池，不进入链表。
    pub fn push_front(&mut self, chunk: Chunk) {
        if chunk.is_empty() {
            self.recycle(chunk);
            return;
        }
        self.bytes += chunk.len();
        self.chunks.push_front(chunk);
    }

    /// 在尾部追加一个块；空块直接归还块池，不进入链表。
    pub fn push_back(&mut self, chunk: Chunk) {
        if chunk.is_empty() {
            self.recycle(chunk);
            return;
        }
        self.bytes += chunk.len();
        self.chunks.push_back(chunk);
    }

    /// 把 `p` 拷贝进一个池化缓冲并插入头部；`p` 为空时不做任何事。
    pub fn push_bytes_front(&mut self, p: &[u8]) {
        if p.is_empty() {
            return;
        }
        let chunk = self.chunk_from(p);
        self.push_front(chunk);
    }

    /// 把 `p` 拷贝进一个池化缓冲并追加到尾部；`p` 为空时不做任何事。
    pub fn push_bytes_back(&mut self, p: &[u8]) {
        if p.is_empty() {
            return;
        }
        let chunk = self.chunk_from(p);
        self.push_back(chunk);
    }

    fn chunk_from(&self, p: &[u8]) -> Chunk {
        let mut buf = self.pool.acquire();
        buf.put_slice(p);
        Chunk::new(buf)
    }

    /// 移除并返回头部的块，块的所有权交给调用方。
    ///
    /// 调用方用完后可以通过 [`recycle`](Self::recycle) 把块还给链表所属的池。
    pub fn pop(&mut self) -> Option<Chunk> {
        let chunk = self.chunks.pop_front()?;
        self.bytes -= chunk.len();
        Some(chunk)
    }

    /// 把不再使用的块归还块池。
    pub fn recycle(&self, chunk: Chunk) {
        self.pool.release(chunk.into_inner());
    }

    /// 按链表顺序返回每个块的字节视图。
    pub fn peek_bytes_list(&self) -> Vec<&[u8]> {
        let mut out = Vec::with_capacity(self.chunks.len());
        self.peek_bytes_list_into(&mut out);
        out
    }

    /// 同 [`peek_bytes_list`](Self::peek_bytes_list)，结果写入调用方提供的 `out`（先清空）。
    pub fn peek_bytes_list_into<'a>(&'a self, out: &mut Vec<&'a [u8]>) {
        out.clear();
        out.extend(self.chunks.iter().map(Chunk::as_bytes));
    }

    /// 先放入 `extra` 中非空的字节序列，再按链表顺序放入各块视图。
    ///
    /// 用于在向量化写出前附加带外数据（例如协议头），而无需把它们拷贝进链表。
    pub fn peek_bytes_list_with_bytes<'a>(&'a self, extra: &[&'a [u8]]) -> Vec<&'a [u8]> {
        let mut out = Vec::with_capacity(extra.len() + self.chunks.len());
        out.extend(extra.iter().copied().filter(|b| !b.is_empty()));
        out.extend(self.chunks.iter().map(Chunk::as_bytes));
        out
    }

    /// 从头部丢弃 `n` 个字节。
    ///
    /// # 执行逻辑（How）
    /// - 逐个弹出头部块：块长度大于剩余的 `n` 时在原地切掉前 `n` 字节并放回头部，随即结束；
    /// - 否则整块归还块池，`n` 扣除该块长度后继续；
    /// - 链表提前耗尽时安全停止。
    pub fn discard_bytes(&mut self, mut n: usize) {
        while n > 0 {
            let Some(mut chunk) = self.pop() else {
                break;
            };
            if n < chunk.len() {
                chunk.buf.advance(n);
                self.push_front(chunk);
                break;
            }
            n -= chunk.len();
            self.recycle(chunk);
        }
    }

    /// 块数量。
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// 全部块的总字节数。
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// 按顺序遍历各块。
    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    /// 清空链表，全部块归还块池。
    pub fn reset(&mut self) {
        while let Some(chunk) = self.chunks.pop_front() {
            self.pool.release(chunk.into_inner());
        }
        self.bytes = 0;
    }
}

impl<P: ChunkPool> Drop for ChunkList<P> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<P: ChunkPool> fmt::Debug for ChunkList<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkList")
            .field("len", &self.chunks.len())
            .field("bytes", &self.bytes)
            .finish()
    }
}

/// `Buf` 视角：整个链表是一条逻辑字节序列，`advance` 即 `discard_bytes`。
impl<P: ChunkPool> Buf for ChunkList<P> {
    fn remaining(&self) -> usize {
        self.bytes
    }

    fn chunk(&self) -> &[u8] {
        self.chunks.front().map(Chunk::as_bytes).unwrap_or_default()
    }

    fn chunks_vectored<'a>(&'a self, dst: &mut [IoSlice<'a>]) -> usize {
        let mut filled = 0;
        for (slot, chunk) in dst.iter_mut().zip(self.chunks.iter()) {
            *slot = IoSlice::new(chunk.as_bytes());
            filled += 1;
        }
        filled
    }

    fn advance(&mut self, cnt: usize) {
        self.discard_bytes(cnt);
    }
}
