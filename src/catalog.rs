//! Where queue items come from: Subsonic catalog entries, plain URLs and local files.

use crate::player::QueueItem;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use url::Url;

const API_VERSION: &str = "1.16.1";

/// Turns a catalog track id into something the media engine can open.
pub trait LocatorSource: Send + Sync {
    fn playable_locator(&self, track_id: &str) -> String;
}

/// Stream URLs against a Subsonic-compatible server.
#[derive(Debug, Clone)]
pub struct SubsonicLocator {
    base: Url,
    username: String,
    password: String,
    client_name: String,
}

impl SubsonicLocator {
    pub fn new(
        server_url: &str,
        username: &str,
        password: &str,
        client_name: &str,
    ) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(server_url)?;
        // Url::join drops the last segment unless the path ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            username: username.to_string(),
            password: password.to_string(),
            client_name: client_name.to_string(),
        })
    }
}

impl LocatorSource for SubsonicLocator {
    fn playable_locator(&self, track_id: &str) -> String {
        let mut url = match self.base.join("rest/stream") {
            Ok(url) => url,
            Err(_) => self.base.clone(),
        };
        url.query_pairs_mut()
            .append_pair("id", track_id)
            .append_pair("u", &self.username)
            .append_pair("p", &format!("enc:{}", hex::encode(&self.password)))
            .append_pair("v", API_VERSION)
            .append_pair("c", &self.client_name);
        url.into()
    }
}

/// A `song` entry as returned by the Subsonic JSON API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSong {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: u32,
    pub track: u32,
    pub disc_number: u32,
    pub cover_art: String,
    pub year: u32,
}

impl CatalogSong {
    pub fn into_queue_item(self, locators: &dyn LocatorSource) -> QueueItem {
        QueueItem {
            locator: locators.playable_locator(&self.id),
            id: self.id,
            title: self.title,
            artist: self.artist,
            album: self.album,
            duration: self.duration,
            track_number: self.track,
            disc_number: self.disc_number,
            cover_art: self.cover_art,
            year: self.year,
        }
    }
}

/// Resolve a command-line track argument.
///
/// URLs and existing files are played as given; anything else is taken to
/// be a catalog id and needs a locator source.
pub fn resolve_track_spec(spec: &str, locators: Option<&dyn LocatorSource>) -> Option<QueueItem> {
    if spec.starts_with("http://") || spec.starts_with("https://") {
        return Some(QueueItem::from_locator(spec));
    }

    let path = Path::new(spec);
    if path.exists() {
        let locator = path
            .canonicalize()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| spec.to_string());
        return Some(local_item(&locator));
    }

    match locators {
        Some(source) => Some(QueueItem {
            id: spec.to_string(),
            locator: source.playable_locator(spec),
            title: spec.to_string(),
            ..Default::default()
        }),
        None => {
            debug!(spec, "not a file or URL and no catalog configured");
            None
        }
    }
}

#[cfg(feature = "tags")]
fn local_item(locator: &str) -> QueueItem {
    use lofty::file::{AudioFile, TaggedFileExt};
    use lofty::tag::Accessor;

    let mut item = QueueItem::from_locator(locator);
    let tagged = match lofty::read_from_path(locator) {
        Ok(tagged) => tagged,
        Err(e) => {
            debug!(locator, "no tags: {}", e);
            return item;
        }
    };

    item.duration = tagged.properties().duration().as_secs() as u32;
    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(title) = tag.title() {
            item.title = title.into_owned();
        }
        item.artist = tag.artist().map(|a| a.into_owned()).unwrap_or_default();
        item.album = tag.album().map(|a| a.into_owned()).unwrap_or_default();
        item.track_number = tag.track().unwrap_or(0);
        item.disc_number = tag.disk().unwrap_or(0);
    }
    item
}

#[cfg(not(feature = "tags"))]
fn local_item(locator: &str) -> QueueItem {
    QueueItem::from_locator(locator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> SubsonicLocator {
        SubsonicLocator::new("https://music.example.org/sub", "ana", "s3cret", "cadence").unwrap()
    }

    #[test]
    fn test_stream_url() {
        let url = Url::parse(&locator().playable_locator("tr 42")).unwrap();
        assert_eq!(url.path(), "/sub/rest/stream");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("id".into(), "tr 42".into())));
        assert!(pairs.contains(&("u".into(), "ana".into())));
        assert!(pairs.contains(&("p".into(), "enc:733363726574".into())));
        assert!(pairs.contains(&("v".into(), "1.16.1".into())));
        assert!(pairs.contains(&("c".into(), "cadence".into())));
    }

    #[test]
    fn test_catalog_song_to_item() {
        let song: CatalogSong = serde_json::from_str(
            r#"{"id":"s1","title":"So What","artist":"Miles Davis","album":"Kind of Blue",
                "duration":562,"track":1,"discNumber":1,"coverArt":"al-1","year":1959,
                "suffix":"flac"}"#,
        )
        .unwrap();

        let item = song.into_queue_item(&locator());
        assert_eq!(item.id, "s1");
        assert_eq!(item.track_number, 1);
        assert_eq!(item.cover_art, "al-1");
        assert!(item.locator.contains("id=s1"));
    }

    #[test]
    fn test_track_specs() {
        let url = resolve_track_spec("https://radio.example.org/live.mp3", None).unwrap();
        assert_eq!(url.title, "live");

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Intro.ogg");
        std::fs::write(&file, b"not really audio").unwrap();
        let local = resolve_track_spec(file.to_str().unwrap(), None).unwrap();
        assert_eq!(local.title, "Intro");

        assert!(resolve_track_spec("tr-7", None).is_none());
        let catalog = resolve_track_spec("tr-7", Some(&locator())).unwrap();
        assert!(catalog.locator.contains("id=tr-7"));
    }
}
