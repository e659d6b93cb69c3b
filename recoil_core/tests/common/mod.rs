#![allow(dead_code)]

use recoil_core::settings::MemoryStore;
use recoil_core::weapon::WeaponTable;
use recoil_core::{Rect, Session};

pub const DAY: u32 = 20210430;

/// Three shots along +x, 100 ms apart; one three-round magazine.
pub fn line_table() -> WeaponTable {
    WeaponTable::from_json_str(
        r#"[{
            "name": "line",
            "mags": [{ "size": 3, "audio": "line_0" }, { "size": 2, "audio": "line_1" }],
            "time_points": [0, 100, 200],
            "x": [0, 2, 4],
            "y": [0, 0, 0]
        }]"#,
    )
    .unwrap()
}

/// Session on the line weapon at `scale == 1`.
pub fn line_session() -> (Session, MemoryStore) {
    let store = MemoryStore::from_pairs([("game:weapon", "line"), ("game:sens", "1")]);
    let mut session =
        Session::with_seed(store.clone(), line_table(), Rect::from_size(800.0, 600.0), 7).unwrap();
    session.pin_day(DAY);
    (session, store)
}
