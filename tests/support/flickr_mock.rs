//! Mock Flickr REST endpoint and media host built on wiremock.

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// REST path the client is pointed at.
pub const REST_PATH: &str = "/services/rest/";

/// Base URL for `FlickrClient::with_base_url`.
pub fn rest_url(server: &MockServer) -> String {
    format!("{}{REST_PATH}", server.uri())
}

/// A set member as listed by `flickr.photosets.getPhotos`.
#[derive(Debug, Clone)]
pub struct MockItem {
    pub id: &'static str,
    pub title: &'static str,
    pub media: &'static str,
}

impl MockItem {
    pub fn photo(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title,
            media: "photo",
        }
    }

    pub fn video(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title,
            media: "video",
        }
    }
}

/// `flickr.photosets.getPhotos` body for one page.
pub fn photoset_page(title: &str, items: &[MockItem], page: u32, pages: u32, total: usize) -> Value {
    let photos: Vec<Value> = items
        .iter()
        .map(|item| json!({"id": item.id, "title": item.title, "media": item.media}))
        .collect();
    json!({
        "photoset": {
            "id": "72157600000000001",
            "title": title,
            "ownername": "harbourmaster",
            "page": page,
            "pages": pages,
            "per_page": 500,
            "total": total.to_string(),
            "photo": photos
        },
        "stat": "ok"
    })
}

/// `stat=fail` body.
pub fn failure(code: i64, message: &str) -> Value {
    json!({"stat": "fail", "code": code, "message": message})
}

/// Mounts a single-page set listing.
pub async fn mount_set(server: &MockServer, title: &str, items: &[MockItem]) {
    Mock::given(method("GET"))
        .and(path(REST_PATH))
        .and(query_param("method", "flickr.photosets.getPhotos"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(photoset_page(title, items, 1, 1, items.len())),
        )
        .mount(server)
        .await;
}

/// Mounts one page of a multi-page listing.
pub async fn mount_set_page(
    server: &MockServer,
    items: &[MockItem],
    page: u32,
    pages: u32,
    total: usize,
) {
    mount_set_page_delayed(server, items, page, pages, total, None).await;
}

/// Mounts one page of a multi-page listing, answered after `delay`.
pub async fn mount_set_page_delayed(
    server: &MockServer,
    items: &[MockItem],
    page: u32,
    pages: u32,
    total: usize,
    delay: Option<Duration>,
) {
    let mut template =
        ResponseTemplate::new(200).set_body_json(photoset_page("Paged", items, page, pages, total));
    if let Some(delay) = delay {
        template = template.set_delay(delay);
    }
    Mock::given(method("GET"))
        .and(path(REST_PATH))
        .and(query_param("method", "flickr.photosets.getPhotos"))
        .and(query_param("page", page.to_string()))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Mounts a `stat=fail` answer for the listing call.
pub async fn mount_set_failure(server: &MockServer, code: i64, message: &str) {
    Mock::given(method("GET"))
        .and(path(REST_PATH))
        .and(query_param("method", "flickr.photosets.getPhotos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(failure(code, message)))
        .mount(server)
        .await;
}

/// Mounts `flickr.photos.getSizes` for one item, with renditions hosted on
/// the same server under `/media/<id>/<label>.<ext>`.
///
/// `labels` are `(label, media)` pairs; photo renditions get `.jpg`,
/// video renditions `.mp4`.
pub async fn mount_sizes(server: &MockServer, item_id: &str, labels: &[(&str, &str)]) {
    let sizes: Vec<Value> = labels
        .iter()
        .map(|(label, media)| {
            json!({
                "label": label,
                "width": 1024,
                "height": 768,
                "source": media_url(server, item_id, label, media),
                "url": format!("https://www.flickr.com/photos/x/{item_id}/sizes/"),
                "media": media
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(REST_PATH))
        .and(query_param("method", "flickr.photos.getSizes"))
        .and(query_param("photo_id", item_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sizes": {"canblog": 0, "canprint": 0, "candownload": 1, "size": sizes},
            "stat": "ok"
        })))
        .mount(server)
        .await;
}

/// URL of a rendition mounted by [`mount_sizes`].
pub fn media_url(server: &MockServer, item_id: &str, label: &str, media: &str) -> String {
    format!("{}{}", server.uri(), media_path(item_id, label, media))
}

/// Path of a rendition mounted by [`mount_sizes`].
pub fn media_path(item_id: &str, label: &str, media: &str) -> String {
    let ext = if media == "video" { "mp4" } else { "jpg" };
    let slug = label.to_lowercase().replace(' ', "-");
    format!("/media/{item_id}/{slug}.{ext}")
}

/// Serves `body` at a rendition path, optionally after a delay.
pub async fn mount_media(
    server: &MockServer,
    item_id: &str,
    label: &str,
    media: &str,
    body: &[u8],
    delay: Option<Duration>,
) {
    let mut template = ResponseTemplate::new(200).set_body_bytes(body.to_vec());
    if let Some(delay) = delay {
        template = template.set_delay(delay);
    }
    Mock::given(method("GET"))
        .and(path(media_path(item_id, label, media)))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Mounts sizes plus the chosen rendition's body in one call.
pub async fn mount_item(
    server: &MockServer,
    item_id: &str,
    labels: &[(&str, &str)],
    served: (&str, &str),
    body: &[u8],
) {
    mount_sizes(server, item_id, labels).await;
    mount_media(server, item_id, served.0, served.1, body, None).await;
}
