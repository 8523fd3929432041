use composer_core::{image_markdown, ContentBuffer};
use pretty_assertions::assert_eq;

#[test]
fn insert_into_empty_buffer_adds_no_newlines() {
    let mut buffer = ContentBuffer::default();
    let caret = buffer.insert_at(0, "![image](a.png)");

    assert_eq!(buffer.as_str(), "![image](a.png)");
    assert_eq!(caret, buffer.len());
}

#[test]
fn insert_mid_line_puts_reference_on_its_own_line() {
    let mut buffer = ContentBuffer::new("hello world");
    let caret = buffer.insert_at(5, "![image](a.png)");

    assert_eq!(buffer.as_str(), "hello\n![image](a.png)\n world");
    assert_eq!(&buffer.as_str()[..caret], "hello\n![image](a.png)");
}

#[test]
fn insert_respects_existing_newlines() {
    let mut buffer = ContentBuffer::new("line one\nline two");
    let caret = buffer.insert_at(9, "X");

    assert_eq!(buffer.as_str(), "line one\nX\nline two");
    assert_eq!(caret, 10);

    let mut buffer = ContentBuffer::new("end\n");
    let caret = buffer.insert_at(4, "X");
    assert_eq!(buffer.as_str(), "end\nX");
    assert_eq!(caret, 5);
}

#[test]
fn insert_clamps_offsets_past_the_end_and_inside_characters() {
    let mut buffer = ContentBuffer::new("abc");
    buffer.insert_at(99, "X");
    assert_eq!(buffer.as_str(), "abc\nX");

    // 'é' is two bytes; offset 2 falls inside it and is floored to 1.
    let mut buffer = ContentBuffer::new("aé");
    buffer.insert_at(2, "X");
    assert_eq!(buffer.as_str(), "a\nX\né");
}

#[test]
fn remove_by_url_strips_every_occurrence_and_collapses_blank_lines() {
    let url = "https://cdn.example.com/a.png";
    let mut buffer = ContentBuffer::new(format!(
        "\n\nintro\n\n{}\n\n\n\nmiddle\n![other alt]({url})\n\n",
        image_markdown(url)
    ));

    buffer.remove_by_url(url);

    assert_eq!(buffer.as_str(), "intro\n\nmiddle");
    assert!(!buffer.as_str().contains("\n\n\n"));
}

#[test]
fn remove_by_url_treats_regex_metacharacters_literally() {
    let mut buffer = ContentBuffer::new("![x](a+b.png?x=(1))\n![y](aab.png?x=1)");

    buffer.remove_by_url("a+b.png?x=(1)");
    assert_eq!(buffer.as_str(), "![y](aab.png?x=1)");

    let mut buffer = ContentBuffer::new("keep ![x](a.b) and ![y](aXb)");
    buffer.remove_by_url("a.b");
    assert_eq!(buffer.as_str(), "keep  and ![y](aXb)");
}

#[test]
fn remove_by_url_is_idempotent_and_noop_when_absent() {
    let mut buffer = ContentBuffer::new("text\n\n![image](u1)\n\n\nmore ![image](u2)");
    buffer.remove_by_url("u1");
    let once = buffer.clone();
    buffer.remove_by_url("u1");
    assert_eq!(buffer, once);

    let mut untouched = ContentBuffer::new("no images here");
    untouched.remove_by_url("missing");
    assert_eq!(untouched.as_str(), "no images here");
}

#[test]
fn image_urls_are_listed_in_order() {
    let buffer = ContentBuffer::new("![a](u1) text ![](u2)\n![image](u1)");
    assert_eq!(buffer.image_urls(), vec!["u1", "u2", "u1"]);
}
