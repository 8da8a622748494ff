/// Vocabulary for room codes: short, concrete words that are easy to read
/// out loud. The two-digit suffix widens the space so collisions under
/// concurrent creation stay rare; uniqueness itself is enforced by the
/// store's code reservation, not here.
const CODE_WORDS: &[&str] = &[
    "APPLE", "BEACH", "CLOUD", "DELTA", "EAGLE", "FLAME", "GRAPE", "HONEY",
    "IVORY", "JUMBO", "KOALA", "LEMON", "MANGO", "NOBLE", "OCEAN", "PIANO",
    "QUILT", "RIVER", "SOLAR", "TIGER", "ULTRA", "VIVID", "WHALE", "YACHT",
    "ZEBRA", "AMBER", "BLAZE", "CEDAR", "DUNES", "EMBER", "FROST", "GLIDE",
    "HAZEL", "IGLOO", "JOLLY", "KARMA", "LUNAR", "MAPLE", "NORTH", "OPERA",
    "PEARL", "QUEST", "ROBIN", "STORM", "TULIP", "UNITY", "VIOLET", "WINDY",
];

/// Produce a candidate room code, e.g. `MANGO42`. May return duplicates;
/// callers must retry against [`RoomStore::create_room`] until the
/// reservation succeeds.
///
/// [`RoomStore::create_room`]: crate::store::RoomStore::create_room
pub fn generate_room_code() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let word = CODE_WORDS[rng.random_range(0..CODE_WORDS.len())];
    format!("{}{:02}", word, rng.random_range(0..100))
}
