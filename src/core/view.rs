use axum::response::Html;
use crate::core::library::PaginatedResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageLevel {
    Success,
    Warning,
    Error,
}

impl MessageLevel {
    fn css(&self) -> &'static str {
        match self {
            MessageLevel::Success => "success",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "danger",
        }
    }
}

// Message is a one-shot notice shown above the page body
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn success(text: &str) -> Self {
        Self { level: MessageLevel::Success, text: text.to_string() }
    }

    pub fn warning(text: &str) -> Self {
        Self { level: MessageLevel::Warning, text: text.to_string() }
    }

    pub fn error(text: &str) -> Self {
        Self { level: MessageLevel::Error, text: text.to_string() }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const NAV: &[(&str, &str)] = &[
    ("/", "Home"),
    ("/books", "Books"),
    ("/authors/new", "New author"),
    ("/books/new", "New book"),
    ("/members/new", "New member"),
    ("/loans/new", "New loan"),
    ("/admin/authors", "Admin: authors"),
    ("/admin/books", "Admin: books"),
    ("/admin/members", "Admin: members"),
    ("/admin/loans", "Admin: loans"),
];

// wraps a body fragment in the site layout; `body` must already be escaped
pub fn page(title: &str, messages: &[Message], body: &str) -> Html<String> {
    let nav: String = NAV.iter()
        .map(|(href, label)| format!("<a href=\"{}\">{}</a>", href, label))
        .collect::<Vec<_>>()
        .join(" | ");
    let notices: String = messages.iter()
        .map(|m| format!("<div class=\"alert alert-{}\">{}</div>\n", m.level.css(), escape(&m.text)))
        .collect();
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n\
         <body>\n<nav>{nav}</nav>\n<main>\n<h1>{title}</h1>\n{notices}{body}\n</main>\n</body>\n</html>\n",
        title = escape(title), nav = nav, notices = notices, body = body))
}

fn field_errors(errors: &[String]) -> String {
    errors.iter()
        .map(|e| format!("<div class=\"invalid-feedback\">{}</div>", escape(e)))
        .collect()
}

pub fn input(kind: &str, name: &str, label: &str, value: &str, errors: &[String]) -> String {
    format!("<p><label for=\"id_{name}\">{label}</label>\n<input type=\"{kind}\" name=\"{name}\" id=\"id_{name}\" value=\"{value}\">{errors}</p>\n",
            name = name, label = escape(label), kind = kind, value = escape(value), errors = field_errors(errors))
}

// options are (value, label) pairs
pub fn select(name: &str, label: &str, options: &[(String, String)], selected: &str, errors: &[String]) -> String {
    let mut opts = String::from("<option value=\"\">---------</option>");
    for (value, text) in options {
        let attr = if value == selected { " selected" } else { "" };
        opts.push_str(&format!("<option value=\"{}\"{}>{}</option>", escape(value), attr, escape(text)));
    }
    format!("<p><label for=\"id_{name}\">{label}</label>\n<select name=\"{name}\" id=\"id_{name}\">{opts}</select>{errors}</p>\n",
            name = name, label = escape(label), opts = opts, errors = field_errors(errors))
}

pub fn form(action: &str, fields: &str, submit: &str) -> String {
    format!("<form method=\"post\" action=\"{}\">\n{}<button type=\"submit\">{}</button>\n</form>",
            escape(action), fields, escape(submit))
}

// listing filters travel in the query string
pub fn search_form(action: &str, fields: &str) -> String {
    format!("<form method=\"get\" action=\"{}\">\n{}<button type=\"submit\">Search</button>\n</form>",
            escape(action), fields)
}

// cells are html fragments, callers escape text themselves
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "<p>No records found.</p>".to_string();
    }
    let head: String = headers.iter().map(|h| format!("<th>{}</th>", escape(h))).collect();
    let body: String = rows.iter()
        .map(|row| format!("<tr>{}</tr>\n", row.iter().map(|c| format!("<td>{}</td>", c)).collect::<String>()))
        .collect();
    format!("<table>\n<thead><tr>{}</tr></thead>\n<tbody>\n{}</tbody>\n</table>", head, body)
}

// link to the following page, keeping the current filters in `query`
pub fn pager<T>(path: &str, query: &[(&str, &str)], result: &PaginatedResult<T>) -> String {
    match result.next_page {
        Some(ref next) => {
            let mut params: Vec<String> = query.iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| format!("{}={}", k, url_encode(v)))
                .collect();
            params.push(format!("page={}", next));
            format!("<p><a href=\"{}?{}\">Next page</a></p>", path, escape(&params.join("&")))
        }
        None => String::new(),
    }
}

pub fn url_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::core::library::PaginatedResult;
    use crate::core::view::{escape, input, page, pager, search_form, select, table, url_encode, Message};

    #[tokio::test]
    async fn test_should_escape_html() {
        assert_eq!("&lt;b&gt;Tom &amp; &quot;Jerry&quot;&#x27;s&lt;/b&gt;", escape("<b>Tom & \"Jerry\"'s</b>"));
    }

    #[tokio::test]
    async fn test_should_render_page_with_messages() {
        let html = page("Books", &[Message::error("<oops>")], "<p>body</p>").0;
        assert!(html.contains("<title>Books</title>"));
        assert!(html.contains("alert-danger\">&lt;oops&gt;"));
        assert!(html.contains("<p>body</p>"));
    }

    #[tokio::test]
    async fn test_should_render_fields() {
        let html = input("text", "name", "Name", "a\"b", &["This field is required.".to_string()]);
        assert!(html.contains("value=\"a&quot;b\""));
        assert!(html.contains("This field is required."));
        let options = vec![("1".to_string(), "One".to_string()), ("2".to_string(), "Two".to_string())];
        let html = select("book", "Book", &options, "2", &[]);
        assert!(html.contains("<option value=\"2\" selected>Two</option>"));
        assert!(html.contains("<option value=\"1\">One</option>"));
    }

    #[tokio::test]
    async fn test_should_render_search_form() {
        let html = search_form("/admin/books", input("text", "q", "Search", "", &[]).as_str());
        assert!(html.starts_with("<form method=\"get\" action=\"/admin/books\">"));
        assert!(html.contains("name=\"q\""));
    }

    #[tokio::test]
    async fn test_should_render_empty_table() {
        assert_eq!("<p>No records found.</p>", table(&["Title"], &[]));
        assert!(table(&["Title"], &[vec!["Dune".to_string()]]).contains("<td>Dune</td>"));
    }

    #[tokio::test]
    async fn test_should_render_pager() {
        let res = PaginatedResult::new(None, 1, Some("1".to_string()), vec![1]);
        let html = pager("/admin/books", &[("q", "dom casmurro"), ("year", "")], &res);
        assert!(html.contains("href=\"/admin/books?q=dom+casmurro&amp;page=1\""));
        let res: PaginatedResult<i32> = PaginatedResult::new(None, 1, None, vec![]);
        assert_eq!("", pager("/admin/books", &[], &res));
        assert_eq!("a%26b%3Dc", url_encode("a&b=c"));
    }
}
