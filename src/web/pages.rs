use std::collections::BTreeMap;
use std::path::Path;

/// Escape text for interpolation into HTML bodies
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The tail view: sticky header with quick links, info line, log content,
/// and a meta-refresh directive so the browser re-polls on its own.
pub fn log_page(source: &str, content: &str, lines: usize, refresh_interval: u64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta http-equiv="refresh" content="{refresh_interval}">
    <title>Logs - {source}</title>
    <style>
        body {{
            margin: 0;
            padding: 20px;
            background-color: #1e1e1e;
            color: #d4d4d4;
            font-family: 'Courier New', monospace;
            font-size: 13px;
        }}
        .header {{
            position: sticky;
            top: 0;
            background-color: #2d2d2d;
            padding: 10px 15px;
            margin: -20px -20px 20px -20px;
            border-bottom: 2px solid #007acc;
            display: flex;
            justify-content: space-between;
            align-items: center;
        }}
        .header h1 {{
            margin: 0;
            font-size: 18px;
            color: #007acc;
        }}
        .controls {{
            display: flex;
            gap: 10px;
        }}
        .controls a {{
            color: #007acc;
            text-decoration: none;
            padding: 5px 10px;
            border: 1px solid #007acc;
            border-radius: 3px;
            font-size: 12px;
        }}
        .controls a:hover {{
            background-color: #007acc;
            color: #ffffff;
        }}
        .info {{
            color: #858585;
            margin-bottom: 10px;
            font-size: 11px;
        }}
        pre {{
            margin: 0;
            white-space: pre-wrap;
            word-wrap: break-word;
            line-height: 1.5;
        }}
    </style>
</head>
<body>
    <div class="header">
        <h1>Log Viewer - {title}</h1>
        <div class="controls">
            <a href="?lines=100">100 lines</a>
            <a href="?lines=500">500 lines</a>
            <a href="?lines=1000">1000 lines</a>
            <a href="?download=true">Download Full Log</a>
        </div>
    </div>
    <div class="info">
        Showing last {lines} lines | Auto-refresh every {refresh_interval} seconds
    </div>
    <pre>{content}</pre>
</body>
</html>"#,
        title = escape_html(&source.to_uppercase()),
        source = escape_html(source),
    )
}

/// The index: one link per configured source
pub fn index_page(sources: &BTreeMap<String, String>) -> String {
    let links: String = sources
        .keys()
        .map(|name| {
            format!(
                "        <a href=\"/logs-{name}\">View {title} logs</a>\n",
                name = escape_html(name),
                title = escape_html(name),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Log Viewer</title>
    <style>
        body {{
            margin: 0;
            padding: 40px;
            background-color: #1e1e1e;
            color: #d4d4d4;
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
        }}
        h1 {{
            color: #007acc;
        }}
        .links {{
            margin-top: 30px;
        }}
        .links a {{
            display: block;
            color: #007acc;
            text-decoration: none;
            padding: 15px 20px;
            margin: 10px 0;
            border: 1px solid #007acc;
            border-radius: 5px;
            font-size: 16px;
            transition: all 0.3s;
        }}
        .links a:hover {{
            background-color: #007acc;
            color: #ffffff;
        }}
    </style>
</head>
<body>
    <h1>Log Viewer</h1>
    <div class="links">
{links}    </div>
</body>
</html>"#
    )
}

/// Shown when a configured source's file is missing on disk
pub fn missing_page(path: &Path) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Log Not Found</title>
    <style>
        body {{
            margin: 0;
            padding: 40px;
            background-color: #1e1e1e;
            color: #d4d4d4;
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
        }}
        .error {{
            color: #f48771;
            border: 1px solid #f48771;
            padding: 20px;
            border-radius: 5px;
        }}
        a {{
            color: #007acc;
        }}
    </style>
</head>
<body>
    <div class="error">
        <h2>Log File Not Found</h2>
        <p>The log file at <code>{path}</code> does not exist yet.</p>
        <p>Please ensure the application is running and generating logs.</p>
        <p><a href="/">Back to Home</a></p>
    </div>
</body>
</html>"#,
        path = escape_html(&path.display().to_string()),
    )
}
