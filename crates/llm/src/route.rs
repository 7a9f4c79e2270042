use std::fmt;

/// Coarse attachment category derived from a MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Audio,
    Pdf,
    Other,
}

impl MediaKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            Self::Image
        } else if mime_type.starts_with("audio/") {
            Self::Audio
        } else if mime_type == "application/pdf" {
            Self::Pdf
        } else {
            Self::Other
        }
    }
}

/// Backend generation route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Text,
    Image,
    Audio,
    Pdf,
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Text => "/generate-text",
            Self::Image => "/generate-image",
            Self::Audio => "/generate-audio",
            Self::Pdf => "/generate-pdf",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.path())
    }
}

/// Picks the route for an upload's MIME type, or `/generate-text` when nothing is attached.
pub fn select_route(mime_type: Option<&str>) -> Route {
    match mime_type.map(MediaKind::from_mime) {
        None | Some(MediaKind::Other) => Route::Text,
        Some(MediaKind::Image) => Route::Image,
        Some(MediaKind::Audio) => Route::Audio,
        Some(MediaKind::Pdf) => Route::Pdf,
    }
}
