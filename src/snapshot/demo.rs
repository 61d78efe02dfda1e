use serde_json::{Value, json};

use crate::snapshot::{Snapshot, Source};
use crate::types::spotify::TopLists;

/// Size prefixes of album covers: 640px, 300px, 64px.
const COVER_SIZES: [&str; 3] = ["ab67616d0000b273", "ab67616d00001e02", "ab67616d00004851"];

/// Portrait used for every artist without its own.
const PLACEHOLDER_PORTRAIT: [&str; 3] = [
    "ab6761610000e5eb7da39dea0a72f581535fb11f",
    "ab676161000051747da39dea0a72f581535fb11f",
    "ab6761610000f1787da39dea0a72f581535fb11f",
];

fn images(ids: [&str; 3]) -> Vec<Value> {
    ids.iter()
        .map(|id| json!({ "url": format!("https://i.scdn.co/image/{id}") }))
        .collect()
}

fn artist(name: &str, portrait: [&str; 3], genres: &[&str]) -> Value {
    json!({ "name": name, "images": images(portrait), "genres": genres })
}

fn track(name: &str, artists: &[&str], cover: &str) -> Value {
    let artists: Vec<Value> = artists.iter().map(|name| json!({ "name": name })).collect();
    let cover = COVER_SIZES.map(|size| format!("{size}{cover}"));

    json!({
        "name": name,
        "artists": artists,
        "album": { "images": images(cover.each_ref().map(String::as_str)) },
    })
}

/// Fixed lists shown before the owner has ever authorized.
pub(crate) fn top() -> Snapshot<TopLists> {
    let weeknd = [
        "ab6761610000e5eb214f3cf1cbe7139c1e26ffbb",
        "ab67616100005174e5a079854e9ce459a3346a82",
        "ab6761610000f178214f3cf1cbe7139c1e26ffbb",
    ];

    let artists = vec![
        artist("The Weeknd", weeknd, &["pop", "r&b"]),
        artist("Daft Punk", PLACEHOLDER_PORTRAIT, &["electronic", "dance"]),
        artist("Arctic Monkeys", PLACEHOLDER_PORTRAIT, &["indie rock", "alternative"]),
        artist("Billie Eilish", PLACEHOLDER_PORTRAIT, &["pop", "electropop"]),
        artist("Radiohead", PLACEHOLDER_PORTRAIT, &["alternative rock", "art rock"]),
        artist("Tame Impala", PLACEHOLDER_PORTRAIT, &["psychedelic rock", "indie rock"]),
    ];

    let tracks = vec![
        track("Blinding Lights", &["The Weeknd"], "8863bc11d2aa12b54f5aeb36"),
        track("Get Lucky", &["Daft Punk", "Pharrell Williams"], "8b32b139981e79f2ebe005eb"),
        track("Do I Wanna Know?", &["Arctic Monkeys"], "4ae1c4c5c45aabe565499163"),
        track("bad guy", &["Billie Eilish"], "50a3147b4edd7701a876c6ce"),
        track("Creep", &["Radiohead"], "c8b444df094279e70c0ed85d"),
        track("The Less I Know The Better", &["Tame Impala"], "9e1cfc756886ac782e363d79"),
        track("Watermelon Sugar", &["Harry Styles"], "adaa848e5c4e6b1b0e47cd92"),
        track("Levitating", &["Dua Lipa"], "b98f116b2d27edc9fed85ddc"),
    ];

    Snapshot {
        data: TopLists { artists, tracks },
        source: Source::Demo,
        cached: false,
        last_updated: None,
    }
}
