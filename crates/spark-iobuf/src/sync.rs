//! 忙等互斥锁。
//!
//! # 设计初衷（Why）
//! - [`RingBuffer`](crate::RingBuffer) 与 [`ChunkList`](crate::ChunkList) 自身不加锁，
//!   跨线程共享时需要外部串行化；这类临界区通常只有几次 `memcpy`，
//!   持锁时间远短于一次内核态阻塞/唤醒的开销。
//! - 自旋等待以 CPU 换取不进入内核：竞争时在循环中让出时间片（`spin::relax::Yield`），
//!   避免纯空转把持有者所在的核心饿死。
//!
//! # 契约（What）
//! - 只适合持锁时间极短、竞争高的场景；持锁期间不得执行阻塞 I/O。
//! - 守卫离开作用域即解锁，不存在“忘记 unlock”的路径。

use spin::{
    mutex::{SpinMutex, SpinMutexGuard},
    relax::Yield,
};

/// 在竞争时让出时间片的自旋互斥锁。
pub type SpinLock<T> = SpinMutex<T, Yield>;

/// [`SpinLock`] 的 RAII 守卫。
pub type SpinLockGuard<'a, T> = SpinMutexGuard<'a, T>;
