//! Trạng thái hiển thị và zoom liên kết giữa ba bảng niên biểu.

use chronicle_core::{PanelKind, YearRange};

/// Bảng nào đang được bật trong nhóm "hiển thị".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelVisibility {
    pub dynasty: bool,
    pub event: bool,
    pub figure: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            dynasty: true,
            event: true,
            figure: true,
        }
    }
}

impl PanelVisibility {
    pub fn shows(self, panel: PanelKind) -> bool {
        match panel {
            PanelKind::Dynasty => self.dynasty,
            PanelKind::Event => self.event,
            PanelKind::Figure => self.figure,
        }
    }

    pub fn toggled(self, panel: PanelKind) -> Self {
        match panel {
            PanelKind::Dynasty => Self {
                dynasty: !self.dynasty,
                ..self
            },
            PanelKind::Event => Self {
                event: !self.event,
                ..self
            },
            PanelKind::Figure => Self {
                figure: !self.figure,
                ..self
            },
        }
    }
}

/// Thao tác trên trục năm mà Plotly báo qua `plotly_relayout`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomEvent {
    /// Người dùng kéo chọn một khoảng năm.
    Range(f64, f64),
    /// Double-click để trả trục về mặc định.
    Reset,
}

/// Khoảng năm cần áp lên các bảng đang hiển thị.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomSync {
    pub range: [f64; 2],
    /// Reset cũng phải kéo bảng nguồn về khoảng của bộ lọc.
    pub include_source: bool,
}

/// Đồng bộ trục x của ba bảng: zoom một bảng thì các bảng còn lại theo.
///
/// Không đụng tới `FilterState`; khoảng mặc định là khoảng năm của bộ lọc
/// lúc vẽ.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedZoom {
    default_range: [f64; 2],
    last: Option<[f64; 2]>,
}

impl LinkedZoom {
    pub fn new(range: YearRange) -> Self {
        Self {
            default_range: [f64::from(range.lower), f64::from(range.upper)],
            last: None,
        }
    }

    /// `None` khi khoảng này vừa được đồng bộ, tránh vòng lặp relayout.
    pub fn sync(&mut self, event: ZoomEvent) -> Option<ZoomSync> {
        let (range, include_source) = match event {
            ZoomEvent::Range(a, b) => ([a.min(b), a.max(b)], false),
            ZoomEvent::Reset => (self.default_range, true),
        };

        if !include_source && self.last == Some(range) {
            return None;
        }
        self.last = Some(range);
        Some(ZoomSync {
            range,
            include_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_only_flips_one_panel() {
        let visibility = PanelVisibility::default().toggled(PanelKind::Event);

        assert!(visibility.shows(PanelKind::Dynasty));
        assert!(!visibility.shows(PanelKind::Event));
        assert!(visibility.shows(PanelKind::Figure));
        assert_eq!(
            visibility.toggled(PanelKind::Event),
            PanelVisibility::default()
        );
    }

    #[test]
    fn zoom_is_shared_once_and_reset_returns_to_filter_range() {
        let mut zoom = LinkedZoom::new(YearRange::new(-300, 200));

        assert_eq!(
            zoom.sync(ZoomEvent::Range(100.0, -50.0)),
            Some(ZoomSync {
                range: [-50.0, 100.0],
                include_source: false,
            })
        );
        assert_eq!(zoom.sync(ZoomEvent::Range(-50.0, 100.0)), None);

        assert_eq!(
            zoom.sync(ZoomEvent::Reset),
            Some(ZoomSync {
                range: [-300.0, 200.0],
                include_source: true,
            })
        );
        assert_eq!(zoom.sync(ZoomEvent::Range(-300.0, 200.0)), None);
        assert!(zoom.sync(ZoomEvent::Range(0.0, 10.0)).is_some());
    }
}
