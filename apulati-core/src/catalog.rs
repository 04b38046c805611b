//! Static content catalog: works, their scenes, and credits.
//!
//! The site JSON lists each work's media as parallel arrays (one entry per
//! scene). Loading zips them into [`Scene`]s; optional variants may be shorter
//! than `videos` or contain `null`.

use serde::Deserialize;
use crate::config::PlayerConfig;
use crate::error::CatalogError;

/// Identifies one mounted scene tile: `(work, scene)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SceneKey {
    pub work: usize,
    pub scene: usize,
}

impl SceneKey {
    pub fn new(work: usize, scene: usize) -> Self {
        Self { work, scene }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Primary MP4. Always present; the last-resort candidate.
    pub video: String,
    pub safari: Option<String>,
    pub webm: Option<String>,
    pub ogv: Option<String>,
    pub audio: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Credits {
    pub direction: Option<String>,
    pub acting: Option<String>,
    pub video: Option<String>,
    pub light: Option<String>,
    pub costumes: Option<String>,
    pub makeup: Option<String>,
    pub video_production: Option<String>,
}

impl Credits {
    /// Labelled lines for the credits that are present, in display order.
    pub fn lines(&self) -> Vec<(&'static str, &str)> {
        [
            ("Direction", &self.direction),
            ("Acting/Performance", &self.acting),
            ("Video", &self.video),
            ("Light", &self.light),
            ("Costumes", &self.costumes),
            ("Make-up", &self.makeup),
            ("Video production", &self.video_production),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Work {
    pub title: String,
    pub author: String,
    pub scenes: Vec<Scene>,
    pub credits: Credits,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    works: Vec<Work>,
}

impl Catalog {
    pub fn new(works: Vec<Work>) -> Result<Self, CatalogError> {
        if works.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some((index, work)) = works.iter().enumerate().find(|(_, w)| w.scenes.is_empty()) {
            return Err(CatalogError::NoScenes { index, title: work.title.clone() });
        }
        Ok(Self { works })
    }

    pub fn works(&self) -> &[Work] {
        &self.works
    }

    pub fn work(&self, index: usize) -> Option<&Work> {
        self.works.get(index)
    }

    pub fn work_count(&self) -> usize {
        self.works.len()
    }

    pub fn scene_count(&self, work: usize) -> usize {
        self.works.get(work).map_or(0, |w| w.scenes.len())
    }

    pub fn scene(&self, key: SceneKey) -> Option<&Scene> {
        self.works.get(key.work)?.scenes.get(key.scene)
    }

    pub fn contains(&self, key: SceneKey) -> bool {
        self.scene(key).is_some()
    }

    /// Every scene key, work-major.
    pub fn keys(&self) -> impl Iterator<Item = SceneKey> + '_ {
        self.works.iter().enumerate().flat_map(|(w, work)| {
            (0..work.scenes.len()).map(move |s| SceneKey::new(w, s))
        })
    }
}

/// Everything the page needs from `site.json`.
#[derive(Clone, Debug)]
pub struct Site {
    pub title: String,
    pub player: PlayerConfig,
    pub catalog: Catalog,
}

#[derive(Deserialize)]
struct RawSite {
    #[serde(default)]
    title: String,
    #[serde(default)]
    player: PlayerConfig,
    works: Vec<RawWork>,
}

#[derive(Deserialize)]
struct RawWork {
    title: String,
    #[serde(default)]
    author: String,
    videos: Vec<String>,
    #[serde(default)]
    safari: Vec<Option<String>>,
    #[serde(default)]
    webm: Vec<Option<String>>,
    #[serde(default)]
    ogv: Vec<Option<String>>,
    #[serde(default)]
    audio: Vec<Option<String>>,
    #[serde(default)]
    credits: Credits,
}

impl RawWork {
    fn into_work(self) -> Work {
        let pick = |list: &[Option<String>], i: usize| {
            list.get(i).cloned().flatten().filter(|p| !p.is_empty()).map(|p| asset_path(&p))
        };
        let scenes = self
            .videos
            .iter()
            .enumerate()
            .map(|(i, video)| Scene {
                video: asset_path(video),
                safari: pick(&self.safari, i),
                webm: pick(&self.webm, i),
                ogv: pick(&self.ogv, i),
                audio: pick(&self.audio, i),
            })
            .collect();
        Work {
            title: self.title,
            author: self.author,
            scenes,
            credits: self.credits,
        }
    }
}

impl Site {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawSite = serde_json::from_str(json)?;
        let catalog = Catalog::new(raw.works.into_iter().map(RawWork::into_work).collect())?;
        log::info!(
            "Loaded catalog: {} works, {} scenes",
            catalog.work_count(),
            catalog.keys().count()
        );
        Ok(Self {
            title: raw.title,
            player: raw.player,
            catalog,
        })
    }
}

/// Normalise a media path to the relative `./…` form the static host serves.
/// Absolute URLs pass through untouched.
pub fn asset_path(path: &str) -> String {
    if path.starts_with("./") || path.contains("://") {
        path.to_string()
    } else {
        format!("./{}", path.trim_start_matches('/'))
    }
}
