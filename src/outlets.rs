//! Static mapping from press outlet names (as shown on the portal) to the
//! office ids used in listing URLs.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static PRESS_IDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Newspapers
        ("한겨레", "028"),
        ("조선일보", "023"),
        ("중앙일보", "025"),
        ("동아일보", "020"),
        ("경향신문", "032"),
        ("한국일보", "469"),
        ("서울신문", "081"),
        ("세계일보", "022"),
        ("문화일보", "021"),
        ("국민일보", "005"),
        ("매일신문", "088"),
        ("부산일보", "082"),
        ("전북일보", "087"),
        ("전주일보", "086"),
        ("강원일보", "085"),
        ("대구일보", "084"),
        ("광주일보", "083"),
        ("제주일보", "089"),
        ("경남일보", "090"),
        ("경북일보", "091"),
        // Broadcasters
        ("KBS", "056"),
        ("MBC", "214"),
        ("SBS", "055"),
        ("YTN", "052"),
        ("채널A", "277"),
        ("TV조선", "448"),
        ("MBN", "057"),
        ("연합뉴스TV", "422"),
        ("CBS", "079"),
        ("BBS", "078"),
        ("TBS", "077"),
        ("OBS", "353"),
        ("G1", "076"),
        ("KNN", "075"),
        ("TJB", "074"),
        ("JTV", "073"),
        ("KBC", "072"),
        ("JIBS", "071"),
        ("KBSN", "070"),
        ("KBS WORLD", "069"),
        // Wire services and business/tech press
        ("연합뉴스", "001"),
        ("뉴시스", "003"),
        ("뉴스1", "421"),
        ("뉴스타운", "006"),
        ("아시아경제", "277"),
        ("매일경제", "009"),
        ("한국경제", "015"),
        ("파이낸셜뉴스", "014"),
        ("서울경제", "011"),
        ("헤럴드경제", "016"),
        ("이데일리", "018"),
        ("머니투데이", "008"),
        ("아시아투데이", "007"),
        ("디지털타임스", "029"),
        ("전자신문", "030"),
        ("ZDNet Korea", "092"),
        ("테크홀릭", "093"),
        ("IT조선", "094"),
        ("IT동아", "095"),
        ("IT월드", "096"),
    ])
});

/// Looks up the portal office id for an outlet name.
pub fn resolve(name: &str) -> Option<&'static str> {
    PRESS_IDS.get(name.trim()).copied()
}

/// Outlet names known to this build, for operator-facing error messages.
pub fn known_outlets() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = PRESS_IDS.keys().copied().collect();
    names.sort_unstable();
    names
}
