use serde::{Deserialize, Serialize};
use std::fmt;

pub type TrackId = u64;

/// A queue entry: enough to display a track and to load it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    pub id: TrackId,
    pub name: String,
    pub artists: Vec<String>,
}

impl TrackRef {
    pub fn display(&self) -> String {
        if self.artists.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.artists.join(", "))
        }
    }
}

/// Access restriction of a track as reported by `/song/detail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeTier {
    Free,
    /// Subscription only (fee 1).
    Restricted,
    /// Must be bought individually (fee 4).
    PayPerItem,
    Unknown(i64),
}

impl FeeTier {
    pub fn is_restricted(self) -> bool {
        self == FeeTier::Restricted
    }

    pub fn code(self) -> i64 {
        match self {
            FeeTier::Free => 0,
            FeeTier::Restricted => 1,
            FeeTier::PayPerItem => 4,
            FeeTier::Unknown(n) => n,
        }
    }
}

impl From<i64> for FeeTier {
    fn from(fee: i64) -> Self {
        match fee {
            0 => FeeTier::Free,
            1 => FeeTier::Restricted,
            4 => FeeTier::PayPerItem,
            n => FeeTier::Unknown(n),
        }
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeTier::Free => f.write_str("free"),
            FeeTier::Restricted => f.write_str("subscription only"),
            FeeTier::PayPerItem => f.write_str("pay per item"),
            FeeTier::Unknown(n) => write!(f, "fee {n}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SongDetailResponse {
    #[serde(default)]
    pub songs: Vec<SongDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SongDetail {
    pub id: TrackId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fee: i64,
    #[serde(default, rename = "ar")]
    pub artists: Vec<ArtistInfo>,
    #[serde(rename = "al")]
    pub album: Option<AlbumInfo>,
    /// Duration in milliseconds.
    #[serde(default, rename = "dt")]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistInfo {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumInfo {
    pub name: Option<String>,
    #[serde(rename = "picUrl")]
    pub pic_url: Option<String>,
}

impl SongDetail {
    pub fn fee_tier(&self) -> FeeTier {
        FeeTier::from(self.fee)
    }

    pub fn artist_names(&self) -> Vec<String> {
        self.artists.iter().filter_map(|a| a.name.clone()).collect()
    }

    pub fn album_name(&self) -> Option<&str> {
        self.album.as_ref().and_then(|a| a.name.as_deref())
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.album.as_ref().and_then(|a| a.pic_url.as_deref())
    }

    pub fn to_track_ref(&self) -> TrackRef {
        TrackRef {
            id: self.id,
            name: self.name.clone(),
            artists: self.artist_names(),
        }
    }
}

/// `data` is an array on `/song/url*` and an object on some deployments.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::Many(v) => v.into_iter().next(),
            OneOrMany::One(t) => Some(t),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SongUrlResponse {
    pub data: Option<OneOrMany<SongUrl>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongUrl {
    pub url: Option<String>,
    #[serde(default)]
    pub br: u32,
    #[serde(default)]
    pub size: u64,
    pub md5: Option<String>,
    pub level: Option<String>,
}

/// `/song/url/match` answers with either a song-url object or a bare URL.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchResponse {
    pub data: Option<MatchData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MatchData {
    Url(String),
    Song(SongUrl),
}

impl MatchData {
    pub fn into_song_url(self) -> SongUrl {
        match self {
            MatchData::Url(url) => SongUrl {
                url: Some(url),
                ..SongUrl::default()
            },
            MatchData::Song(s) => s,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LyricResponse {
    pub lrc: Option<LyricBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LyricBody {
    pub lyric: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn song_detail_from_api_shape() {
        let v = json!({
            "code": 200,
            "songs": [{
                "id": 347230,
                "name": "海阔天空",
                "fee": 1,
                "ar": [{"id": 11127, "name": "Beyond"}],
                "al": {"id": 34209, "name": "海阔天空", "picUrl": "http://p1.music.126.net/x.jpg"},
                "dt": 326000
            }]
        });
        let resp: SongDetailResponse = serde_json::from_value(v).unwrap();
        let song = &resp.songs[0];
        assert_eq!(song.fee_tier(), FeeTier::Restricted);
        assert_eq!(song.artist_names(), vec!["Beyond".to_string()]);
        assert_eq!(song.album_name(), Some("海阔天空"));
        assert_eq!(song.duration_ms, 326000);
        assert_eq!(song.to_track_ref().display(), "海阔天空 - Beyond");
    }

    #[test]
    fn song_url_data_may_be_object_or_array() {
        let arr: SongUrlResponse =
            serde_json::from_value(json!({"data": [{"url": "http://a/1.mp3", "br": 128000}]}))
                .unwrap();
        let obj: SongUrlResponse =
            serde_json::from_value(json!({"data": {"url": "http://a/2.mp3", "size": 10}})).unwrap();
        assert_eq!(arr.data.unwrap().into_first().unwrap().br, 128000);
        assert_eq!(obj.data.unwrap().into_first().unwrap().size, 10);
    }

    #[test]
    fn match_data_accepts_bare_url() {
        let m: MatchResponse =
            serde_json::from_value(json!({"code": 200, "data": "https://cdn/x.flac"})).unwrap();
        let song = m.data.unwrap().into_song_url();
        assert_eq!(song.url.as_deref(), Some("https://cdn/x.flac"));
    }

    #[test]
    fn unknown_fee_values_round_trip_their_code() {
        assert_eq!(FeeTier::from(8), FeeTier::Unknown(8));
        assert_eq!(FeeTier::from(8).code(), 8);
        assert!(!FeeTier::from(8).is_restricted());
    }
}
