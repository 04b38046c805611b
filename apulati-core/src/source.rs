//! Per-browser ordering of a scene's encoded video variants.
//!
//! The orders are empirical: each engine gets the variant that decoded most
//! reliably on it first, and the media element falls through the `<source>`
//! list until one loads.

use crate::catalog::Scene;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserProfile {
    Safari,
    Firefox,
    Chrome,
    Other,
}

impl BrowserProfile {
    /// Classify by engine. Every iOS browser is WebKit, so iOS counts as Safari.
    pub fn from_user_agent(ua: &str) -> Self {
        if ["iPhone", "iPad", "iPod"].iter().any(|d| ua.contains(d)) {
            Self::Safari
        } else if ua.contains("Firefox/") {
            Self::Firefox
        } else if ["Chrome/", "Chromium/", "Edg/", "OPR/"].iter().any(|b| ua.contains(b)) {
            Self::Chrome
        } else if ua.contains("Safari/") {
            Self::Safari
        } else {
            Self::Other
        }
    }

    fn order(self) -> [Variant; 4] {
        use Variant::*;
        match self {
            Self::Safari => [Safari, Primary, Webm, Ogv],
            Self::Firefox => [Webm, Ogv, Safari, Primary],
            Self::Chrome => [Primary, Webm, Ogv, Safari],
            Self::Other => [Webm, Ogv, Safari, Primary],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    Primary,
    Safari,
    Webm,
    Ogv,
}

impl Variant {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Primary | Self::Safari => "video/mp4",
            Self::Webm => "video/webm; codecs=\"vp8, vorbis\"",
            Self::Ogv => "video/ogg; codecs=\"theora, vorbis\"",
        }
    }

    fn url(self, scene: &Scene) -> Option<&str> {
        match self {
            Self::Primary => Some(scene.video.as_str()),
            Self::Safari => scene.safari.as_deref(),
            Self::Webm => scene.webm.as_deref(),
            Self::Ogv => scene.ogv.as_deref(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceCandidate {
    pub url: String,
    pub mime: &'static str,
    pub variant: Variant,
}

/// Ordered `<source>` candidates for `scene`. Absent variants are skipped;
/// the primary is always in the list.
pub fn candidates(scene: &Scene, profile: BrowserProfile) -> Vec<SourceCandidate> {
    profile
        .order()
        .into_iter()
        .filter_map(|variant| {
            variant.url(scene).map(|url| SourceCandidate {
                url: url.to_string(),
                mime: variant.mime(),
                variant,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_scene() -> Scene {
        Scene {
            video: "p.mp4".into(),
            safari: Some("s.mp4".into()),
            webm: Some("w.webm".into()),
            ogv: Some("o.ogv".into()),
            audio: Some("a.mp3".into()),
        }
    }

    fn variants(scene: &Scene, profile: BrowserProfile) -> Vec<Variant> {
        candidates(scene, profile).into_iter().map(|c| c.variant).collect()
    }

    #[test]
    fn test_safari_order() {
        let list = candidates(&full_scene(), BrowserProfile::Safari);
        let urls: Vec<&str> = list.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, ["s.mp4", "p.mp4", "w.webm", "o.ogv"]);
        assert_eq!(list[0].mime, "video/mp4");
    }

    #[test]
    fn test_other_orders() {
        use Variant::*;
        let scene = full_scene();
        assert_eq!(variants(&scene, BrowserProfile::Firefox), [Webm, Ogv, Safari, Primary]);
        assert_eq!(variants(&scene, BrowserProfile::Chrome), [Primary, Webm, Ogv, Safari]);
        assert_eq!(variants(&scene, BrowserProfile::Other), [Webm, Ogv, Safari, Primary]);
    }

    #[test]
    fn test_missing_variants_omitted() {
        let scene = Scene {
            safari: None,
            ogv: None,
            ..full_scene()
        };
        assert_eq!(
            variants(&scene, BrowserProfile::Safari),
            [Variant::Primary, Variant::Webm]
        );

        let bare = Scene { webm: None, ..scene };
        for profile in [BrowserProfile::Safari, BrowserProfile::Firefox, BrowserProfile::Chrome, BrowserProfile::Other] {
            assert_eq!(variants(&bare, profile), [Variant::Primary], "{profile:?}");
        }
    }

    #[test]
    fn test_user_agent_classification() {
        let cases = [
            ("Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15", BrowserProfile::Safari),
            ("Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/123.0 Mobile/15E148 Safari/604.1", BrowserProfile::Safari),
            ("Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0", BrowserProfile::Firefox),
            ("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36", BrowserProfile::Chrome),
            ("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0", BrowserProfile::Chrome),
            ("curl/8.5", BrowserProfile::Other),
        ];
        for (ua, expected) in cases {
            assert_eq!(BrowserProfile::from_user_agent(ua), expected, "{ua}");
        }
    }
}
