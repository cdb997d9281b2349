//! 2 的幂对齐工具。
//!
//! 环形缓冲的容量与切片池的尺寸分级都以 2 的幂为单位，这里集中放置相关的位运算，
//! 两个函数的下限都是 2，与环形缓冲“非零容量至少为 2”的约束一致。

/// [`ceil_pow2`] 可接受的最大输入，超过后结果已无法用 `usize` 表示为后续翻倍留出余量。
pub const MAX_POW2_INPUT: usize = 1 << (usize::BITS - 2);

/// 判断 `n` 是否为 2 的幂；`0` 视为否。
pub const fn is_pow2(n: usize) -> bool {
    n.is_power_of_two()
}

/// 返回不小于 `n` 的最小 2 的幂，最小为 2。
///
/// # Panics
/// `n` 超过 [`MAX_POW2_INPUT`] 时 panic。这属于调用方的编程错误：
/// 请求的缓冲尺寸已超出平台可表示范围，不作为可恢复错误处理。
pub fn ceil_pow2(n: usize) -> usize {
    assert!(
        n <= MAX_POW2_INPUT,
        "argument is too large: {n} exceeds {MAX_POW2_INPUT}"
    );
    if n <= 2 {
        return 2;
    }
    n.next_power_of_two()
}

/// 返回不大于 `n` 的最大 2 的幂，最小为 2。
pub const fn floor_pow2(n: usize) -> usize {
    if n <= 2 {
        return 2;
    }
    1 << (usize::BITS - 1 - n.leading_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_rounds_up_with_floor_of_two() {
        assert_eq!(ceil_pow2(0), 2);
        assert_eq!(ceil_pow2(1), 2);
        assert_eq!(ceil_pow2(2), 2);
        assert_eq!(ceil_pow2(3), 4);
        assert_eq!(ceil_pow2(1024), 1024);
        assert_eq!(ceil_pow2(1025), 2048);
        assert_eq!(ceil_pow2(MAX_POW2_INPUT), MAX_POW2_INPUT);
    }

    #[test]
    #[should_panic(expected = "argument is too large")]
    fn ceil_rejects_unrepresentable_sizes() {
        let _ = ceil_pow2(MAX_POW2_INPUT + 1);
    }

    #[test]
    fn floor_rounds_down_with_floor_of_two() {
        assert_eq!(floor_pow2(0), 2);
        assert_eq!(floor_pow2(3), 2);
        assert_eq!(floor_pow2(4), 4);
        assert_eq!(floor_pow2(1023), 512);
        assert_eq!(floor_pow2(usize::MAX), 1 << (usize::BITS - 1));
    }

    #[test]
    fn is_pow2_excludes_zero() {
        assert!(!is_pow2(0));
        assert!(is_pow2(1));
        assert!(is_pow2(64));
        assert!(!is_pow2(96));
    }
}
