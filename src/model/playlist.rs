//! Fixed demonstration playlist

use super::track::Track;

pub const DEMO_TRACK_COUNT: usize = 11;

const DEMO_AUDIO_URI: &str = "https://storage.googleapis.com/exoplayer-test-media-0/play.mp3";
const DEMO_ARTWORK_URI: &str =
    "https://upload.wikimedia.org/wikipedia/commons/4/41/Sunflower_from_Silesia2.jpg";
const DEMO_ARTIST: &str = "David BowieR";

/// `count` tracks sharing the canonical audio and artwork URIs,
/// ids `media-N` and titles `Item_N`.
pub fn generate_items(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| {
            Track::new(
                format!("media-{}", i),
                DEMO_AUDIO_URI,
                format!("Item_{}", i),
                DEMO_ARTIST,
                DEMO_ARTWORK_URI,
            )
        })
        .collect()
}

pub fn demo_playlist() -> Vec<Track> {
    generate_items(DEMO_TRACK_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_playlist_is_sequential() {
        let items = demo_playlist();
        assert_eq!(items.len(), 11);
        assert_eq!(items[0].id, "media-0");
        assert_eq!(items[10].id, "media-10");
        assert_eq!(items[10].title, "Item_10");
        assert!(items.iter().all(|t| t.uri == DEMO_AUDIO_URI && t.artwork_uri == DEMO_ARTWORK_URI));
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(generate_items(3), generate_items(3));
    }
}
