//! 宿主输入接口错误类型

use thiserror::Error;

/// 宿主输入接口错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// 所需能力不可用（无显示连接、缺少扩展、平台不支持）
    #[error("Input host unavailable: {0}")]
    Unavailable(String),

    /// 查询失败（几何信息、指针位置）
    #[error("Host query failed: {0}")]
    QueryFailed(String),

    /// 事件注入失败
    #[error("Failed to inject input: {0}")]
    InjectionFailed(String),
}

/// 宿主输入接口结果类型
pub type HostResult<T> = Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_display() {
        let error = HostError::Unavailable("no X display".to_string());
        assert!(error.to_string().contains("unavailable"));
        assert!(error.to_string().contains("no X display"));

        let error = HostError::InjectionFailed("button 1".to_string());
        assert!(error.to_string().contains("button 1"));
    }

    #[test]
    fn test_host_error_equality() {
        assert_eq!(
            HostError::QueryFailed("a".to_string()),
            HostError::QueryFailed("a".to_string())
        );
        assert_ne!(
            HostError::QueryFailed("a".to_string()),
            HostError::Unavailable("a".to_string())
        );
    }
}
