//! Page fixtures shared by the integration tests.

#![allow(dead_code)]

/// A comment whose author link sits two levels above the text.
pub fn comment(handle: &str, text: &str) -> String {
    format!(
        r#"<li><div><a href="/{handle}/">{handle}</a><div><div><span>{text}</span></div></div></div></li>"#
    )
}

/// A comment without any author link.
pub fn anonymous_comment(text: &str) -> String {
    format!("<li><div><div><div><span>{text}</span></div></div></div></li>")
}

/// A post page holding `comments` in its thread.
pub fn thread(comments: &[String]) -> String {
    format!(
        "<html><head><title>Giveaway</title></head><body><article><section></section><ul>{}</ul></article></body></html>",
        comments.concat()
    )
}

/// A thread of `n` comments by distinct authors.
pub fn thread_of(n: usize) -> String {
    let comments: Vec<String> = (0..n)
        .map(|i| comment(&format!("user{i}"), &format!("Comment number {i}")))
        .collect();
    thread(&comments)
}

/// A thread of `n` comments with a visible "load more" button below it.
pub fn thread_with_button(n: usize) -> String {
    thread_of(n).replace(
        "</ul></article>",
        "</ul><button>Load more comments</button></article>",
    )
}

pub const POST_URL: &str = "https://www.instagram.com/p/ABC123/";
