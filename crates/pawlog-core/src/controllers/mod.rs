//! Per-screen view state.
//!
//! A controller owns the snapshot one screen renders. It loads on
//! activation, reloads on an explicit refresh, and reloads after its own
//! successful writes. Read failures never propagate: they become
//! [`LoadState::Failed`] plus a [`Notice`] the shell drains and shows.

mod pets_list;
mod single_pet;

pub use pets_list::PetsListController;
pub use single_pet::SinglePetController;

/// `Idle → Loading → {Ready | Empty | Failed}`; refresh re-enters `Loading`.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(T),
    Empty,
    Failed(String),
}

impl<T> LoadState<T> {
    /// True until the first load has settled.
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Idle | Self::Loading)
    }

    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message for the shell to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_and_loading_both_count_as_loading() {
        assert!(LoadState::<()>::Idle.is_loading());
        assert!(LoadState::<()>::Loading.is_loading());
        assert!(!LoadState::<()>::Empty.is_loading());
        assert!(!LoadState::Ready(1).is_loading());
    }

    #[test]
    fn accessors_expose_data_and_reason() {
        assert_eq!(LoadState::Ready(3).data(), Some(&3));
        assert_eq!(LoadState::<u8>::Failed("offline".into()).error(), Some("offline"));
        assert_eq!(LoadState::<u8>::Empty.data(), None);
    }
}
