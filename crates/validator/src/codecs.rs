/// Human-readable name for an audio codec short name.
///
/// Unknown codecs are returned unchanged.
pub fn audio_friendly_name(codec: &str) -> &str {
    if codec.eq_ignore_ascii_case("ac3") {
        "Dolby Digital"
    } else if codec.eq_ignore_ascii_case("eac3") {
        "Dolby Digital+"
    } else if codec.eq_ignore_ascii_case("dca") {
        "DTS"
    } else {
        codec
    }
}
