//! 自动扩容的环形字节缓冲。
//!
//! # 模块定位（Why）
//! - 传输层从 socket 读到的字节往往不能一次被解码完，写侧也常因对端窗口不足而积压；
//!   `RingBuffer` 为单条字节流提供“尾部写入、头部读取”的暂存区，读写均不移动已有数据。
//! - 游标相等 (`r == w`) 同时可能表示“空”与“满”，这里用显式的 `is_empty` 标记消解歧义，
//!   而不是牺牲一个哨兵字节，容量可以被完整用满。
//!
//! # 状态模型（What）
//! - **Empty**：`is_empty == true`，`r == w == 0`；
//! - **Nonempty**：`is_empty == false`，`length()` 位于 `[1, cap()]`，`r == w` 时即为满。
//! - 任意一次非空写入进入 Nonempty；读取或丢弃到无可读字节、以及 [`RingBuffer::reset`] 回到 Empty。
//!   没有终态，缓冲可无限复用。
//!
//! # 并发（Trade-offs）
//! - 所有方法都直接修改游标，不做任何同步；跨线程共享时由调用方加锁，
//!   典型做法是每条连接一个缓冲，外层包一把 [`SpinLock`](crate::SpinLock)。

use core::{fmt, mem};
use std::io::{self, IoSlice};

use bytes::{Buf, BufMut, BytesMut};

use crate::{
    byteconv::str_to_bytes,
    config::RingBufferConfig,
    error::BufferError,
    math::ceil_pow2,
    pool::{ChunkPool, GlobalChunkPool, GlobalSlicePool, SlicePool},
};

/// 读写游标独立、容量不足时自动扩容的环形缓冲。
///
/// # 结构设计（How）
/// - `buf`：长度恰为 `size` 的存储，来自切片池，扩容时整体替换并把旧存储归还池；
/// - `size`：当前容量，`0` 表示从未分配过存储，否则为不小于 2 的 2 的幂；
/// - `r` / `w`：下一次读取 / 写入的位置，均位于 `[0, size)`；
/// - `is_empty`：`r == w` 时区分“无可读字节”与“已写满”。
///
/// # 契约说明（What）
/// - 读取类方法（`peek*`、`byte_buffer*`）不移动游标；
/// - `write*` 永远成功，空间不足时先扩容；扩容是唯一会替换存储的时机；
/// - `Drop` 时存储归还给所属的切片池。
pub struct RingBuffer<P: SlicePool = GlobalSlicePool> {
    buf: Vec<u8>,
    size: usize,
    r: usize,
    w: usize,
    is_empty: bool,
    config: RingBufferConfig,
    pool: P,
}

impl RingBuffer {
    /// 使用进程级切片池与默认扩容参数创建缓冲。
    ///
    /// `size` 向上对齐到 2 的幂（最小为 2）；传入 `0` 得到不持有存储的空缓冲，
    /// 首次写入时才按 [`DEFAULT_BUFFER_SIZE`](crate::DEFAULT_BUFFER_SIZE) 分配。
    pub fn new(size: usize) -> Self {
        Self::with_pool(size, GlobalSlicePool)
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<P: SlicePool> RingBuffer<P> {
    /// 使用指定切片池创建缓冲。
    pub fn with_pool(size: usize, pool: P) -> Self {
        Self::with_config(size, RingBufferConfig::default(), pool)
    }

    /// 使用指定扩容参数与切片池创建缓冲。
    pub fn with_config(size: usize, config: RingBufferConfig, pool: P) -> Self {
        let (buf, size) = if size == 0 {
            (Vec::new(), 0)
        } else {
            let size = ceil_pow2(size);
            (pool.acquire(size), size)
        };
        Self {
            buf,
            size,
            r: 0,
            w: 0,
            is_empty: true,
            config,
            pool,
        }
    }

    /// 返回最多 `n` 个可读字节的视图，不移动读游标。
    ///
    /// 可读区域跨越存储末尾时拆成 `head` 与 `tail` 两段，按顺序拼接即为逻辑字节序列；
    /// 否则 `tail` 为空。缓冲为空或 `n == 0` 时两段都为空。
    pub fn peek(&self, n: usize) -> (&[u8], &[u8]) {
        if self.is_empty || n == 0 {
            return (&[], &[]);
        }

        if self.w > self.r {
            let m = (self.w - self.r).min(n);
            return (&self.buf[self.r..self.r + m], &[]);
        }

        let m = (self.size - self.r + self.w).min(n);
        if self.r + m <= self.size {
            (&self.buf[self.r..self.r + m], &[])
        } else {
            let c1 = self.size - self.r;
            (&self.buf[self.r..], &self.buf[..m - c1])
        }
    }

    /// 返回全部可读字节的视图，不移动读游标。
    pub fn peek_all(&self) -> (&[u8], &[u8]) {
        if self.is_empty {
            return (&[], &[]);
        }
        if self.w > self.r {
            return (&self.buf[self.r..self.w], &[]);
        }
        (&self.buf[self.r..], &self.buf[..self.w])
    }

    /// 跳过 `n` 个可读字节，不发生拷贝；`n` 不小于可读长度时等价于 [`reset`](Self::reset)。
    pub fn discard(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        if n < self.length() {
            self.r = (self.r + n) % self.size;
        } else {
            self.reset();
        }
    }

    /// 把可读字节拷贝进 `dst` 并推进读游标，返回拷贝的字节数。
    ///
    /// # 契约（What）
    /// - `dst` 为空时返回 `Ok(0)`，不检查缓冲状态；
    /// - 无可读字节时返回 [`BufferError::Empty`]；
    /// - 读到无剩余字节时游标归零，缓冲回到 Empty。
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize, BufferError> {
        if dst.is_empty() {
            return Ok(0);
        }
        if self.is_empty {
            return Err(BufferError::Empty);
        }

        let n = {
            let (head, tail) = self.peek(dst.len());
            dst[..head.len()].copy_from_slice(head);
            dst[head.len()..head.len() + tail.len()].copy_from_slice(tail);
            head.len() + tail.len()
        };
        self.r = (self.r + n) % self.size;
        if self.r == self.w {
            self.reset();
        }
        Ok(n)
    }

    /// 读取并移除一个字节。
    pub fn read_byte(&mut self) -> Result<u8, BufferError> {
        if self.is_empty {
            return Err(BufferError::Empty);
        }
        let b = self.buf[self.r];
        self.r += 1;
        if self.r == self.size {
            self.r = 0;
        }
        if self.r == self.w {
            self.reset();
        }
        Ok(b)
    }

    /// 追加写入 `p` 的全部字节，返回写入的字节数。
    ///
    /// 剩余空间不足时先扩容；写入跨越存储末尾时拆成两次拷贝。永远不会失败。
    pub fn write(&mut self, p: &[u8]) -> usize {
        let n = p.len();
        if n == 0 {
            return 0;
        }

        let free = self.free();
        if n > free {
            self.grow(self.size + n - free);
        }

        if self.w >= self.r {
            let c1 = self.size - self.w;
            if c1 >= n {
                self.buf[self.w..self.w + n].copy_from_slice(p);
                self.w += n;
            } else {
                self.buf[self.w..].copy_from_slice(&p[..c1]);
                let c2 = n - c1;
                self.buf[..c2].copy_from_slice(&p[c1..]);
                self.w = c2;
            }
        } else {
            self.buf[self.w..self.w + n].copy_from_slice(p);
            self.w += n;
        }

        if self.w == self.size {
            self.w = 0;
        }
        self.is_empty = false;
        n
    }

    /// 以字符串形式写入，字节视图直接借用 `s`，不做额外拷贝。
    pub fn write_str(&mut self, s: &str) -> usize {
        self.write(str_to_bytes(s))
    }

    /// 写入一个字节；已满时按最小幅度扩容。
    pub fn write_byte(&mut self, c: u8) {
        if self.free() < 1 {
            self.grow(self.size + 1);
        }
        self.buf[self.w] = c;
        self.w += 1;
        if self.w == self.size {
            self.w = 0;
        }
        self.is_empty = false;
    }

    /// 当前可读字节数。
    pub fn length(&self) -> usize {
        if self.r == self.w {
            if self.is_empty {
                return 0;
            }
            return self.size;
        }
        if self.w > self.r {
            return self.w - self.r;
        }
        self.size - self.r + self.w
    }

    /// 当前剩余可写字节数，恒有 `length() + free() == cap()`。
    pub fn free(&self) -> usize {
        if self.r == self.w {
            if self.is_empty {
                return self.size;
            }
            return 0;
        }
        if self.w < self.r {
            return self.r - self.w;
        }
        self.size - self.w + self.r
    }

    /// 当前容量。
    pub fn cap(&self) -> usize {
        self.size
    }

    /// 底层存储的长度，稳态下与 [`cap`](Self::cap) 相等。
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// 全部可读字节拷贝进一个来自进程级块池的连续缓冲；无可读字节时返回 `None`。
    pub fn byte_buffer(&self) -> Option<BytesMut> {
        self.byte_buffer_in(&GlobalChunkPool)
    }

    /// 同 [`byte_buffer`](Self::byte_buffer)，缓冲取自指定的块池。
    pub fn byte_buffer_in<C: ChunkPool + ?Sized>(&self, pool: &C) -> Option<BytesMut> {
        if self.is_empty {
            return None;
        }
        Some(self.materialize(pool, &[]))
    }

    /// 返回“全部可读字节 + `extra`”组成的连续缓冲，不移动游标。
    pub fn with_byte_buffer(&self, extra: &[u8]) -> BytesMut {
        self.with_byte_buffer_in(&GlobalChunkPool, extra)
    }

    /// 同 [`with_byte_buffer`](Self::with_byte_buffer)，缓冲取自指定的块池。
    pub fn with_byte_buffer_in<C: ChunkPool + ?Sized>(&self, pool: &C, extra: &[u8]) -> BytesMut {
        self.materialize(pool, extra)
    }

    fn materialize<C: ChunkPool + ?Sized>(&self, pool: &C, extra: &[u8]) -> BytesMut {
        let (head, tail) = self.peek_all();
        let mut out = pool.acquire();
        out.reserve(head.len() + tail.len() + extra.len());
        out.put_slice(head);
        out.put_slice(tail);
        out.put_slice(extra);
        out
    }

    /// 是否已写满（游标相等且非空）。
    pub fn is_full(&self) -> bool {
        self.r == self.w && !self.is_empty
    }

    /// 是否没有可读字节。
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// 丢弃全部可读字节，保留已分配的存储。
    pub fn reset(&mut self) {
        self.is_empty = true;
        self.r = 0;
        self.w = 0;
    }

    /// 扩容到至少 `requested` 字节，并把可读字节搬到新存储的头部。
    ///
    /// # 执行逻辑（How）
    /// 1. 由 [`RingBufferConfig::next_capacity`] 决定新容量（倍增或 25% 步进，对齐到 2 的幂）；
    /// 2. 从切片池取得新存储，按 `head`、`tail` 顺序拷贝全部可读字节；
    /// 3. 旧存储归还切片池，游标重置为 `r = 0`、`w = 原可读长度`。
    fn grow(&mut self, requested: usize) {
        let new_cap = self.config.next_capacity(self.size, requested);
        let mut storage = self.pool.acquire(new_cap);

        let readable = {
            let (head, tail) = self.peek_all();
            storage[..head.len()].copy_from_slice(head);
            storage[head.len()..head.len() + tail.len()].copy_from_slice(tail);
            head.len() + tail.len()
        };

        let old = mem::replace(&mut self.buf, storage);
        self.pool.release(old);

        tracing::trace!(
            old_capacity = self.size,
            new_capacity = new_cap,
            readable,
            "ring buffer grown"
        );

        self.size = new_cap;
        self.r = 0;
        self.w = readable;
        self.is_empty = readable == 0;
    }
}

impl<P: SlicePool> Drop for RingBuffer<P> {
    fn drop(&mut self) {
        let storage = mem::take(&mut self.buf);
        self.pool.release(storage);
    }
}

impl<P: SlicePool> fmt::Debug for RingBuffer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("cap", &self.size)
            .field("length", &self.length())
            .field("r", &self.r)
            .field("w", &self.w)
            .field("is_empty", &self.is_empty)
            .finish()
    }
}

/// 作为 `std::io::Read` 使用时，无可读字节视为流结束（返回 `Ok(0)`）。
impl<P: SlicePool> io::Read for RingBuffer<P> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match RingBuffer::read(self, buf) {
            Ok(n) => Ok(n),
            Err(BufferError::Empty) => Ok(0),
        }
    }
}

impl<P: SlicePool> io::Write for RingBuffer<P> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(RingBuffer::write(self, buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        RingBuffer::write(self, buf);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `Buf` 视角：`chunk` 为第一段视图，`chunks_vectored` 最多给出两段，`advance` 即 `discard`。
impl<P: SlicePool> Buf for RingBuffer<P> {
    fn remaining(&self) -> usize {
        self.length()
    }

    fn chunk(&self) -> &[u8] {
        self.peek_all().0
    }

    fn chunks_vectored<'a>(&'a self, dst: &mut [IoSlice<'a>]) -> usize {
        let (head, tail) = self.peek_all();
        let mut filled = 0;
        for part in [head, tail] {
            if filled == dst.len() || part.is_empty() {
                continue;
            }
            dst[filled] = IoSlice::new(part);
            filled += 1;
        }
        filled
    }

    fn advance(&mut self, cnt: usize) {
        self.discard(cnt);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_test::traced_test;

    use super::*;

    /// 记录租借与归还尺寸的切片池桩。
    #[derive(Default)]
    struct RecordingPool {
        acquired: Mutex<Vec<usize>>,
        released: Mutex<Vec<usize>>,
    }

    impl SlicePool for RecordingPool {
        fn acquire(&self, size: usize) -> Vec<u8> {
            self.acquired.lock().expect("mutex poisoned").push(size);
            vec![0; size]
        }

        fn release(&self, buf: Vec<u8>) {
            self.released
                .lock()
                .expect("mutex poisoned")
                .push(buf.len());
        }
    }

    #[test]
    fn grow_swaps_storage_through_the_pool() {
        let pool = Arc::new(RecordingPool::default());
        let mut ring = RingBuffer::with_pool(4, pool.clone());
        ring.write(&[1, 2, 3]);
        ring.write(&[4, 5]);
        assert_eq!(ring.cap(), 8);
        assert_eq!(*pool.acquired.lock().unwrap(), vec![4, 8]);
        assert_eq!(*pool.released.lock().unwrap(), vec![4]);

        drop(ring);
        assert_eq!(*pool.released.lock().unwrap(), vec![4, 8]);
    }

    #[test]
    fn grow_compacts_wrapped_bytes_to_front() {
        let pool = Arc::new(RecordingPool::default());
        let mut ring = RingBuffer::with_pool(4, pool);
        ring.write(&[1, 2, 3, 4]);
        ring.discard(2);
        ring.write(&[5, 6]);
        assert!(ring.is_full());
        assert_eq!(ring.peek_all(), (&[3, 4][..], &[5, 6][..]));

        ring.write_byte(7);
        assert_eq!(ring.cap(), 8);
        assert_eq!(ring.peek_all(), (&[3, 4, 5, 6, 7][..], &[][..]));
        assert_eq!((ring.r, ring.w), (0, 5));
    }

    #[test]
    fn write_byte_on_large_full_buffer_makes_room() {
        let pool = Arc::new(RecordingPool::default());
        let mut ring = RingBuffer::with_pool(8192, pool);
        ring.write(&vec![9; 8192]);
        assert!(ring.is_full());
        ring.write_byte(1);
        assert_eq!(ring.cap(), 16384);
        assert_eq!(ring.length(), 8193);
    }

    #[test]
    fn custom_config_changes_first_allocation() {
        let pool = Arc::new(RecordingPool::default());
        let config = RingBufferConfig::default().with_default_capacity(16);
        let mut ring = RingBuffer::with_config(0, config, pool.clone());
        ring.write(b"abc");
        assert_eq!(ring.cap(), 16);
        assert_eq!(*pool.acquired.lock().unwrap(), vec![16]);
        assert!(pool.released.lock().unwrap().iter().all(|len| *len == 0));
    }

    #[test]
    #[traced_test]
    fn growth_is_traced() {
        let mut ring = RingBuffer::new(2);
        ring.write(b"abc");
        assert!(logs_contain("ring buffer grown"));
    }
}
