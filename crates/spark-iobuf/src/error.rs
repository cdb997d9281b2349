//! 缓冲原语对外暴露的错误类型。

use thiserror::Error;

/// 缓冲操作的失败原因。
///
/// # 教案式说明
/// - **意图 (Why)**：环形缓冲的读取在“没有任何可读字节”时无法给出有意义的结果，
///   需要与“读到 0 字节”区分开，调用方据此决定继续等待对端数据还是结束读取。
/// - **契约 (What)**：除此之外的所有操作都是全函数，越界或退化输入按空操作处理，
///   因此这里只有一个变体；错误总是立即返回给调用方，内部从不重试。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// 在零可读字节的环形缓冲上尝试读取。
    #[error("ring buffer is empty")]
    Empty,
}
