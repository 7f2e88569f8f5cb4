/// The file name of the page for an instrument section named `name`: the name
/// lowercased, with spaces converted to underscores, and `.html` appended.
///
/// ```
/// use bandsite::util::page_file_name;
///
/// assert_eq!(page_file_name("French Horn"), "french_horn.html");
/// assert_eq!(page_file_name("Tuba"), "tuba.html");
/// assert_eq!(page_file_name("Alto  Sax"), "alto__sax.html");
/// ```
pub fn page_file_name(name: &str) -> String {
    let mut output = String::with_capacity(name.len() + 5);
    for ch in name.chars() {
        match ch {
            ' ' => output.push('_'),
            _ => output.extend(ch.to_lowercase()),
        }
    }

    output.push_str(".html");
    output
}

/// Returns the byte offset of the first occurrence of `needle` in `haystack`.
pub fn find(haystack: &str, needle: &str) -> Option<usize> {
    memchr::memmem::find(haystack.as_bytes(), needle.as_bytes())
}

#[cfg(test)]
mod page_name_tests {
    #[test]
    fn test_page_file_name() {
        use crate::util::page_file_name;

        assert_eq!(page_file_name("French Horn"), "french_horn.html");
        assert_eq!(page_file_name("Bass Clarinet"), "bass_clarinet.html");
        assert_eq!(page_file_name("percussion"), "percussion.html");
        assert_eq!(page_file_name(" Flute "), "_flute_.html");
        assert_eq!(page_file_name("ÉUPHONIUM"), "éuphonium.html");
        assert_eq!(page_file_name(""), ".html");
    }
}
