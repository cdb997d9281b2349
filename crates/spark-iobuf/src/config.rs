//! 缓冲与池的可调参数。
//!
//! # 模块定位（Why）
//! - 扩容下限、倍增阈值、池的保留上限都直接影响内存峰值与分配频率，
//!   不同负载（长连接少量大包 / 海量短连接小包）的最优值差异明显。
//! - 默认值与常量保持一致，调用方不配置时行为固定且可预期。
//!
//! # 使用方式（How）
//! - 通过 `Default` 取得默认配置，再以 `with_*` 链式覆盖单个字段；
//!   setter 会就地规范化输入（例如把容量对齐到 2 的幂），因此持有的配置总是合法的。

use crate::math::ceil_pow2;

/// 环形缓冲首次分配时的默认容量（1 KiB）。
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// 超过该容量后，扩容从翻倍改为按 25% 递增（4 KiB）。
pub const BUFFER_GROW_THRESHOLD: usize = 4 * 1024;

/// [`RingBuffer`](crate::RingBuffer) 的扩容参数。
///
/// # 契约说明（What）
/// - `default_capacity`：从未分配过存储的缓冲首次扩容时的容量下限，总是 2 的幂；
/// - `grow_threshold`：当前容量低于该值时翻倍扩容，否则按 25% 步进直到满足请求。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingBufferConfig {
    default_capacity: usize,
    grow_threshold: usize,
}

impl Default for RingBufferConfig {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_BUFFER_SIZE,
            grow_threshold: BUFFER_GROW_THRESHOLD,
        }
    }
}

impl RingBufferConfig {
    /// 覆盖首次扩容容量，输入会向上对齐到 2 的幂。
    pub fn with_default_capacity(mut self, capacity: usize) -> Self {
        self.default_capacity = ceil_pow2(capacity);
        self
    }

    /// 覆盖倍增阈值。
    pub fn with_grow_threshold(mut self, threshold: usize) -> Self {
        self.grow_threshold = threshold;
        self
    }

    /// 从未分配过存储的缓冲首次扩容时使用的容量。
    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }

    /// 翻倍扩容与 25% 步进之间的容量分界。
    pub fn grow_threshold(&self) -> usize {
        self.grow_threshold
    }

    /// 根据当前容量与请求容量计算扩容后的容量。
    ///
    /// # 执行逻辑（How）
    /// 1. `current == 0`：取 `default_capacity` 与 `ceil_pow2(requested)` 中的较大者；
    /// 2. `requested <= 2 * current`：低于阈值时翻倍，否则从 `current` 起每次增加
    ///    `max(n / 4, 1)`，直到不小于 `requested`；
    /// 3. 请求超过两倍当前容量时直接以 `requested` 为目标；
    /// 4. 目标最终对齐到 2 的幂，即切片池为该目标实际分配的尺寸等级；
    ///    请求不超过两倍当前容量时，结果不超过 `2 * current`。
    ///
    /// # 契约（What）
    /// - 返回值总是 2 的幂，且不小于 `requested`；
    /// - 目标超出 [`MAX_POW2_INPUT`](crate::math::MAX_POW2_INPUT) 时 panic。
    pub fn next_capacity(&self, current: usize, requested: usize) -> usize {
        if current == 0 {
            if requested <= self.default_capacity {
                return self.default_capacity;
            }
            return ceil_pow2(requested);
        }

        let doubled = current.saturating_add(current);
        if requested > doubled {
            return ceil_pow2(requested);
        }
        if current < self.grow_threshold {
            return doubled;
        }

        let mut n = current;
        while n < requested {
            n = n.saturating_add((n / 4).max(1));
        }
        // 步进结果对齐后可能越过 2 * current，此时翻倍已足够容纳请求。
        ceil_pow2(n).min(doubled)
    }
}

/// [`ChunkBufferPool`](crate::ChunkBufferPool) 的保留策略。
///
/// # 契约说明（What）
/// - `initial_capacity`：自由链表未命中时新建 `BytesMut` 的初始容量；
/// - `max_retained_capacity`：归还时容量超过该值的缓冲直接释放，避免一次大包长期占住内存；
/// - `max_idle_buffers`：自由链表的长度上限，超出部分直接释放。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPoolConfig {
    initial_capacity: usize,
    max_retained_capacity: usize,
    max_idle_buffers: usize,
}

impl Default for ChunkPoolConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ChunkPoolConfig {
    /// 默认配置的常量形式，供静态池在编译期构造。
    pub const DEFAULT: Self = Self {
        initial_capacity: 64,
        max_retained_capacity: 64 * 1024,
        max_idle_buffers: 1024,
    };

    /// 覆盖未命中时新建缓冲的初始容量。
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// 覆盖可回收缓冲的容量上限。
    pub fn with_max_retained_capacity(mut self, capacity: usize) -> Self {
        self.max_retained_capacity = capacity;
        self
    }

    /// 覆盖自由链表的长度上限。
    pub fn with_max_idle_buffers(mut self, count: usize) -> Self {
        self.max_idle_buffers = count;
        self
    }

    /// 未命中时新建缓冲的初始容量。
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// 归还时允许留存的最大容量。
    pub fn max_retained_capacity(&self) -> usize {
        self.max_retained_capacity
    }

    /// 自由链表最多保留的缓冲数量。
    pub fn max_idle_buffers(&self) -> usize {
        self.max_idle_buffers
    }
}

/// [`SizeClassPool`](crate::SizeClassPool) 的保留策略。
///
/// # 契约说明（What）
/// - `max_retained_capacity`：归还时容量超过该值的切片直接释放，
///   扩容到很大的缓冲析构后不会让对应分级长期占住内存；
/// - `max_idle_per_class`：每个尺寸分级最多缓存的切片数，超出部分直接释放。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlicePoolConfig {
    max_retained_capacity: usize,
    max_idle_per_class: usize,
}

impl Default for SlicePoolConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl SlicePoolConfig {
    /// 默认配置的常量形式，供静态池在编译期构造。
    pub const DEFAULT: Self = Self {
        max_retained_capacity: 4 * 1024 * 1024,
        max_idle_per_class: 16,
    };

    /// 覆盖可回收切片的容量上限。
    pub fn with_max_retained_capacity(mut self, capacity: usize) -> Self {
        self.max_retained_capacity = capacity;
        self
    }

    /// 覆盖单个分级的缓存数量上限。
    pub fn with_max_idle_per_class(mut self, count: usize) -> Self {
        self.max_idle_per_class = count;
        self
    }

    /// 归还时允许留存的最大容量。
    pub fn max_retained_capacity(&self) -> usize {
        self.max_retained_capacity
    }

    /// 每个分级最多缓存的切片数量。
    pub fn max_idle_per_class(&self) -> usize {
        self.max_idle_per_class
    }
}
