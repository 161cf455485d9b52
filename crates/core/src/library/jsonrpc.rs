//! JSON-RPC 2.0 client for the host media library.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::error::LibraryError;
use super::traits::LibraryService;
use super::types::{ItemPage, ShowFile, SongFile, Texture};
use crate::config::LibraryConfig;
use crate::media::MediaType;

/// Library client speaking JSON-RPC over HTTP.
pub struct JsonRpcLibrary {
    client: Client,
    url: String,
    username: Option<String>,
    password: Option<String>,
    next_id: AtomicU64,
}

impl JsonRpcLibrary {
    /// Create a new client with the given configuration.
    pub fn new(config: &LibraryConfig) -> Result<Self, LibraryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LibraryError::ConnectionFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            username: config.username.clone().filter(|u| !u.is_empty()),
            password: config.password.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Sends one request and returns its `result` member.
    async fn call(&self, method: &str, params: Value) -> Result<Value, LibraryError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        debug!(method = method, id = id, "Library request");

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                LibraryError::ConnectionFailed(e.to_string())
            } else {
                LibraryError::invalid(method, e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(LibraryError::invalid(method, format!("HTTP {}", response.status())));
        }

        let mut payload: Value = response
            .json()
            .await
            .map_err(|e| LibraryError::invalid(method, format!("Failed to parse response: {}", e)))?;
        parse_result(method, &mut payload)
    }

    async fn list_with(
        &self,
        media_type: MediaType,
        extra: Map<String, Value>,
        properties: Option<Vec<&str>>,
    ) -> Result<ItemPage, LibraryError> {
        let method = format!("{}.Get{}s", namespace(media_type), media_type.method_name());
        let mut params = Map::new();
        params.insert(
            "sort".to_string(),
            json!({ "method": sort_method(media_type), "order": "ascending" }),
        );
        params.insert(
            "properties".to_string(),
            json!(properties.unwrap_or_else(|| item_properties(media_type).to_vec())),
        );
        params.extend(extra);

        let result = self.call(&method, Value::Object(params)).await?;
        let list_key = format!("{}s", media_type.as_str());
        let items = match result.get(&list_key) {
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err(LibraryError::invalid(&method, format!("'{}' is not a list", list_key))),
            None => Vec::new(),
        };
        let total = result
            .pointer("/limits/total")
            .and_then(Value::as_u64)
            .unwrap_or(items.len() as u64);
        Ok(ItemPage { items, total })
    }

    async fn song_files(&self, filter: Value) -> Result<Vec<SongFile>, LibraryError> {
        let mut extra = Map::new();
        extra.insert("filter".to_string(), filter);
        let page = self
            .list_with(MediaType::Song, extra, Some(vec!["albumid", "file", "disc"]))
            .await?;
        page.items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item)
                    .map_err(|e| LibraryError::invalid("AudioLibrary.GetSongs", e.to_string()))
            })
            .collect()
    }
}

fn parse_result(method: &str, payload: &mut Value) -> Result<Value, LibraryError> {
    if let Some(error) = payload.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        warn!(method = method, code = code, message = %message, "Library returned an error");
        return Err(LibraryError::Rpc {
            method: method.to_string(),
            code,
            message,
        });
    }
    payload
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| LibraryError::invalid(method, "missing result"))
}

fn namespace(media_type: MediaType) -> &'static str {
    if media_type.is_music() {
        "AudioLibrary"
    } else {
        "VideoLibrary"
    }
}

fn sort_method(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Episode | MediaType::Season => "tvshowtitle",
        _ => "sorttitle",
    }
}

fn item_properties(media_type: MediaType) -> &'static [&'static str] {
    match media_type {
        MediaType::Movie => &["art", "imdbnumber", "file", "premiered", "year", "uniqueid", "setid"],
        MediaType::MovieSet => &["art"],
        MediaType::TvShow => &["art", "imdbnumber", "season", "file", "premiered", "uniqueid"],
        MediaType::Episode => &[
            "art", "uniqueid", "tvshowid", "season", "episode", "file", "showtitle", "seasonid",
        ],
        MediaType::Season => &["season", "art", "tvshowid", "showtitle"],
        MediaType::MusicVideo => &["art", "file", "title", "artist"],
        MediaType::Artist => &["art", "musicbrainzartistid"],
        MediaType::Album => &[
            "art", "musicbrainzalbumid", "musicbrainzreleasegroupid", "musicbrainzalbumartistid",
            "artist", "artistid", "title",
        ],
        MediaType::Song => &[
            "art", "musicbrainztrackid", "musicbrainzalbumartistid", "album", "albumartist",
            "albumartistid", "albumid", "file", "disc", "artist", "title",
        ],
    }
}

/// Builds the image cache base URL from the host's web server settings.
fn image_cache_base_from_settings(settings: &[Value]) -> Option<String> {
    if settings.is_empty() {
        return None;
    }
    let mut port = 80;
    let mut username = "";
    let mut password = "";
    let mut secure = false;
    for setting in settings {
        let id = setting.get("id").and_then(Value::as_str).unwrap_or_default();
        let value = setting.get("value");
        match id {
            "services.webserver" if value.and_then(Value::as_bool) == Some(false) => return None,
            "services.webserverusername" => username = value.and_then(Value::as_str).unwrap_or_default(),
            "services.webserverpassword" => password = value.and_then(Value::as_str).unwrap_or_default(),
            "services.webserverport" => port = value.and_then(Value::as_u64).unwrap_or(80),
            "services.webserverssl" => secure = value.and_then(Value::as_bool).unwrap_or(false),
            _ => {}
        }
    }
    let credentials = if !username.is_empty() && !password.is_empty() {
        format!("{}:{}@", username, password)
    } else {
        String::new()
    };
    let scheme = if secure { "https" } else { "http" };
    Some(format!("{}://{}localhost:{}/image/", scheme, credentials, port))
}

#[async_trait]
impl LibraryService for JsonRpcLibrary {
    fn name(&self) -> &str {
        "jsonrpc"
    }

    async fn list_items(&self, media_type: MediaType, range: Option<Range<u64>>) -> Result<ItemPage, LibraryError> {
        let mut extra = Map::new();
        if let Some(range) = range {
            extra.insert(
                "limits".to_string(),
                json!({ "start": range.start, "end": range.end }),
            );
        }
        self.list_with(media_type, extra, None).await
    }

    async fn item_details(&self, media_type: MediaType, dbid: i64) -> Result<Value, LibraryError> {
        let method = format!("{}.Get{}Details", namespace(media_type), media_type.method_name());
        let mut params = Map::new();
        params.insert(media_type.id_key(), json!(dbid));
        params.insert("properties".to_string(), json!(item_properties(media_type)));
        if media_type == MediaType::MovieSet {
            params.insert("movies".to_string(), json!({ "properties": ["art", "file"] }));
        }

        let mut result = self.call(&method, Value::Object(params)).await?;
        let key = format!("{}details", media_type.as_str());
        result
            .get_mut(&key)
            .map(Value::take)
            .ok_or_else(|| LibraryError::NotFound {
                media_type: media_type.to_string(),
                dbid,
            })
    }

    async fn set_art(
        &self,
        media_type: MediaType,
        dbid: i64,
        art: &BTreeMap<String, Option<String>>,
    ) -> Result<(), LibraryError> {
        let method = format!("{}.Set{}Details", namespace(media_type), media_type.method_name());
        let mut params = Map::new();
        params.insert(media_type.id_key(), json!(dbid));
        params.insert("art".to_string(), json!(art));
        self.call(&method, Value::Object(params)).await?;
        Ok(())
    }

    async fn available_art(&self, media_type: MediaType, dbid: i64, art_type: &str) -> Result<Vec<String>, LibraryError> {
        let method = format!("{}.GetAvailableArt", namespace(media_type));
        let params = json!({ "item": { (media_type.id_key()): dbid }, "arttype": art_type });
        let result = self.call(&method, params).await?;
        Ok(result
            .get("availableart")
            .and_then(Value::as_array)
            .map(|options| {
                options
                    .iter()
                    .filter_map(|o| o.get("url").and_then(Value::as_str).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn artists_by_name(&self, name: &str) -> Result<Vec<Value>, LibraryError> {
        let mut extra = Map::new();
        extra.insert(
            "filter".to_string(),
            json!({ "field": "artist", "operator": "is", "value": name }),
        );
        Ok(self.list_with(MediaType::Artist, extra, Some(Vec::new())).await?.items)
    }

    async fn songs_for_album(&self, album_id: i64) -> Result<Vec<SongFile>, LibraryError> {
        self.song_files(json!({ "albumid": album_id })).await
    }

    async fn songs_in_path(&self, path: &str) -> Result<Vec<SongFile>, LibraryError> {
        self.song_files(json!({ "field": "path", "operator": "is", "value": path }))
            .await
    }

    async fn tvshow_files(&self) -> Result<Vec<ShowFile>, LibraryError> {
        let page = self
            .list_with(MediaType::TvShow, Map::new(), Some(vec!["file"]))
            .await?;
        page.items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item)
                    .map_err(|e| LibraryError::invalid("VideoLibrary.GetTVShows", e.to_string()))
            })
            .collect()
    }

    async fn textures(&self, url: Option<&str>) -> Result<Vec<Texture>, LibraryError> {
        let mut params = json!({ "properties": ["url"] });
        if let Some(url) = url {
            params["filter"] = json!({ "field": "url", "operator": "is", "value": url });
        }
        let result = self.call("Textures.GetTextures", params).await?;
        match result.get("textures") {
            Some(textures) => serde_json::from_value(textures.clone())
                .map_err(|e| LibraryError::invalid("Textures.GetTextures", e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    async fn remove_texture(&self, texture_id: i64) -> Result<(), LibraryError> {
        self.call("Textures.RemoveTexture", json!({ "textureid": texture_id }))
            .await?;
        Ok(())
    }

    async fn setting_value(&self, setting: &str) -> Result<Option<Value>, LibraryError> {
        let result = self
            .call("Settings.GetSettingValue", json!({ "setting": setting }))
            .await?;
        Ok(result.get("value").cloned().filter(|v| !v.is_null()))
    }

    async fn image_cache_base(&self) -> Result<Option<String>, LibraryError> {
        let result = self
            .call(
                "Settings.GetSettings",
                json!({ "filter": { "category": "control", "section": "services" } }),
            )
            .await?;
        let settings = result
            .get("settings")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let base = image_cache_base_from_settings(&settings);
        if base.is_none() {
            warn!("Host web server is disabled; local artwork will not be cached");
        }
        Ok(base)
    }
}
