//! Full-screen viewer navigation state
//!
//! Pure navigation logic for the image lightbox: open/close, wrap-around
//! previous/next, thumbnail jumps, and the "3 / 12" position counter. No
//! rendering; a presentation adapter maps this onto whatever surface it has.

use serde::{Deserialize, Serialize};

/// One image entry in a slide show
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageRef {
    /// Asset reference, opaque (path or URL)
    pub source: String,

    /// Caption or alt text
    #[serde(default)]
    pub caption: String,
}

/// Navigable slide show over a collection's images
#[derive(Debug, Clone)]
pub struct SlideShow {
    images: Vec<ImageRef>,
    current: usize,
    open: bool,
}

impl SlideShow {
    pub fn new(images: Vec<ImageRef>) -> Self {
        Self {
            images,
            current: 0,
            open: false,
        }
    }

    /// Build a slide show from a collection's asset references
    pub fn from_collection(collection: &crate::registry::Collection) -> Self {
        let images = collection
            .images
            .iter()
            .map(|source| ImageRef {
                source: source.clone(),
                caption: collection.name.clone(),
            })
            .collect();
        Self::new(images)
    }

    /// Open the viewer at an index, clamped into range
    ///
    /// Returns false (and stays closed) when there are no images.
    pub fn open(&mut self, index: usize) -> bool {
        if self.images.is_empty() {
            return false;
        }
        self.current = index.min(self.images.len() - 1);
        self.open = true;
        true
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Advance to the next image, wrapping past the end
    pub fn next(&mut self) -> Option<&ImageRef> {
        if !self.open || self.images.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.images.len();
        self.images.get(self.current)
    }

    /// Step to the previous image, wrapping before the start
    pub fn previous(&mut self) -> Option<&ImageRef> {
        if !self.open || self.images.is_empty() {
            return None;
        }
        self.current = (self.current + self.images.len() - 1) % self.images.len();
        self.images.get(self.current)
    }

    /// Jump straight to an index (thumbnail click); out of range is a no-op
    pub fn jump(&mut self, index: usize) -> bool {
        if !self.open || index >= self.images.len() {
            return false;
        }
        self.current = index;
        true
    }

    /// The image currently shown, if the viewer is open
    pub fn current(&self) -> Option<&ImageRef> {
        if !self.open {
            return None;
        }
        self.images.get(self.current)
    }

    /// 1-based position and total for the "3 / 12" counter
    pub fn position(&self) -> Option<(usize, usize)> {
        if !self.open || self.images.is_empty() {
            return None;
        }
        Some((self.current + 1, self.images.len()))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// File name a download of `source` should use: the final path segment,
/// falling back to `"image"` for trailing-slash or empty sources
pub fn download_name(source: &str) -> &str {
    match source.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => "image",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(n: usize) -> SlideShow {
        SlideShow::new(
            (0..n)
                .map(|i| ImageRef {
                    source: format!("/images/{}.jpg", i),
                    caption: String::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_open_clamps_index() {
        let mut viewer = show(3);
        assert!(viewer.open(99));
        assert_eq!(viewer.position(), Some((3, 3)));
    }

    #[test]
    fn test_empty_gallery_never_opens() {
        let mut viewer = show(0);
        assert!(!viewer.open(0));
        assert!(!viewer.is_open());
        assert!(viewer.next().is_none());
        assert!(viewer.position().is_none());
    }

    #[test]
    fn test_next_wraps_around() {
        let mut viewer = show(3);
        viewer.open(2);
        assert_eq!(viewer.next().unwrap().source, "/images/0.jpg");
        assert_eq!(viewer.position(), Some((1, 3)));
    }

    #[test]
    fn test_previous_wraps_around() {
        let mut viewer = show(3);
        viewer.open(0);
        assert_eq!(viewer.previous().unwrap().source, "/images/2.jpg");
    }

    #[test]
    fn test_jump() {
        let mut viewer = show(5);
        viewer.open(0);
        assert!(viewer.jump(3));
        assert_eq!(viewer.position(), Some((4, 5)));
        assert!(!viewer.jump(5));
        assert_eq!(viewer.position(), Some((4, 5)));
    }

    #[test]
    fn test_closed_viewer_does_not_navigate() {
        let mut viewer = show(3);
        assert!(viewer.next().is_none());
        viewer.open(1);
        viewer.close();
        assert!(viewer.current().is_none());
        assert!(viewer.previous().is_none());
    }

    #[test]
    fn test_download_name() {
        assert_eq!(download_name("/images/family/beach.jpg"), "beach.jpg");
        assert_eq!(download_name("plain.png"), "plain.png");
        assert_eq!(download_name("/images/dir/"), "image");
        assert_eq!(download_name(""), "image");
    }
}
