//! 字符串与字节视图之间的零拷贝转换。
//!
//! `&str -> &[u8]` 总是安全且零成本；反方向需要 UTF-8 校验，校验本身不复制数据。
//! 对已知合法的数据（例如刚由 `&str` 写入的缓冲片段），可以使用 `unsafe` 版本跳过校验。

use core::str::Utf8Error;

/// 以字节视图借用字符串，不发生分配。
#[inline]
pub fn str_to_bytes(s: &str) -> &[u8] {
    s.as_bytes()
}

/// 将字节视图解释为字符串，仅做 UTF-8 校验，不复制。
#[inline]
pub fn bytes_to_str(b: &[u8]) -> Result<&str, Utf8Error> {
    core::str::from_utf8(b)
}

/// 跳过 UTF-8 校验的版本。
///
/// # Safety
/// 调用方必须保证 `b` 是合法的 UTF-8 序列。
#[inline]
pub unsafe fn bytes_to_str_unchecked(b: &[u8]) -> &str {
    // SAFETY: 由调用方保证输入为合法 UTF-8。
    unsafe { core::str::from_utf8_unchecked(b) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_share_the_same_memory() {
        let text = "spark";
        let bytes = str_to_bytes(text);
        assert_eq!(bytes.as_ptr(), text.as_ptr());
        let back = bytes_to_str(bytes).expect("合法 UTF-8");
        assert_eq!(back.as_ptr(), text.as_ptr());
    }

    #[test]
    fn invalid_utf8_is_reported() {
        assert!(bytes_to_str(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn unchecked_conversion_round_trips() {
        let raw = b"ring";
        let text = unsafe { bytes_to_str_unchecked(raw) };
        assert_eq!(text, "ring");
    }
}
