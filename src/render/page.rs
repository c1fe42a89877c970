//! Static page resources: the per-justification document page and the shared
//! stylesheet.

/// Stylesheet written next to every report as `style.css`.
pub const STYLE: &str = r#"body {
  padding: 2.5%
}

.text-center {
  text-align: center
}

.text-left {
  text-align: left
}

.document-details-modal.modal-body {
  max-height: 80vh;
  overflow-y: auto;
  white-space: pre-wrap;
}

.card {
  position: relative;
  display: flex;
  flex-direction: column;
  min-width: 0;
  word-wrap: break-word;
  background-color: #fff;
  background-clip: border-box;
  border: 1px solid rgba(0, 0, 0, .125);
  border-radius: .25rem;
  width: 100%;
  height: 100%;
  margin: 0 auto;
  float: none;
  margin-bottom: 20px;
}

.card-header {
  padding: .75rem 1.25rem;
  margin-bottom: 0;
  background-color: rgba(0, 0, 0, .03);
  border-bottom: 1px solid rgba(0, 0, 0, .125)
}

.card-body {
  flex: 1 1 auto;
  padding: 1.25rem
}

.bg-light-custom {
  background: #e6e6e6;
}

span.mention.primary-mention {
  background-color: #ffc107
}

span.mention {
  background-color: #FFFF00
}

span.mention-context {
  font-weight: bold
}

ul {
  padding-left: 20px;
}

:target {
  background-color: #FFFF00;
}
"#;

/// A document page: `title` in the card header, `body_html` (already
/// rendered) in the card body, scrolled to the context of `span_key`.
pub fn document_page(title: &str, body_html: &str, span_key: &str) -> String {
    let title = html_escape::encode_text(title);
    let target = html_escape::encode_quoted_attribute(span_key);
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>{title}</title>
    <link rel="stylesheet" href="../style.css">
  </head>
  <body>
    <div class="card" style="width:100%;float:left;">
      <div class="card-header text-center bg-light-custom">
        {title}
      </div>
      <div class="card-body document-details-modal modal-body text-left">{body_html}</div>
    </div>
    <script>
      (function() {{
        var context = document.getElementById('contextof-{target}');
        if (context) {{
          context.scrollIntoView({{ behavior: 'auto', block: 'center', inline: 'center' }});
        }}
      }})();
    </script>
  </body>
</html>
"#
    )
}

/// Opening of a report page linking `style.css`.
pub fn report_header(title: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <link rel=\"stylesheet\" href=\"style.css\">\n</head>\n<body>",
        html_escape::encode_text(title)
    )
}

pub const REPORT_FOOTER: &str = "</body>\n</html>\n";
