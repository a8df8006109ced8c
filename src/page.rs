use crate::models::Language;
use html_escape::{encode_double_quoted_attribute, encode_text};

const HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>OpenRouter Chunk Processor</title>
    <meta charset="utf-8">
    <style>
        body { font-family: Arial, sans-serif; max-width: 860px; margin: 0 auto; padding: 20px; }
        .form-group { margin-bottom: 15px; }
        label { display: block; margin-bottom: 5px; }
        select, input, textarea { width: 100%; padding: 8px; box-sizing: border-box; }
        button { background: #0070f3; color: white; border: none; padding: 10px 15px; cursor: pointer; margin-right: 8px; }
        button:disabled { background: #999; cursor: default; }
        .result { margin-top: 20px; padding: 15px; background: #f5f5f5; border-radius: 5px; white-space: pre-wrap; }
        .bar { height: 12px; background: #e0e0e0; border-radius: 6px; overflow: hidden; }
        .bar > div { height: 100%; background: #0070f3; width: 0%; }
    </style>
</head>
<body>
    <h1>OpenRouter Chunk Processor</h1>
"#;

const FORM_TAIL: &str = r#"
    <div class="form-group">
        <label for="apiKey">API Key:</label>
        <input type="password" id="apiKey" placeholder="Enter your OpenRouter API key">
    </div>
    <div class="form-group">
        <label for="splitMethod">Split Method:</label>
        <select id="splitMethod">
            <option value="chapter" selected>By Chapter (第X章/Chương X)</option>
            <option value="count">By Character/Word Count</option>
        </select>
    </div>
    <div class="form-group">
        <label for="splitLength" id="splitLengthLabel">Characters per part:</label>
        <input type="number" id="splitLength" value="1000">
    </div>
    <div class="form-group">
        <label for="prompt">Prompt:</label>
        <textarea id="prompt" rows="4"></textarea>
    </div>
    <div class="form-group">
        <label for="additionalText">Additional Text:</label>
        <textarea id="additionalText" rows="10"></textarea>
    </div>
    <button id="submitBtn">Process Text</button>
    <button id="stopBtn" disabled>Stop</button>
    <button id="loadBtn">Load Results</button>

    <h3>Progress <span id="progressText">0%</span></h3>
    <div class="bar"><div id="progressBar"></div></div>
    <div class="result" id="currentProgress"></div>
    <h3>Current Result</h3>
    <div class="result" id="currentResult"></div>
    <h3>Final Result</h3>
    <div class="result" id="finalResult"></div>
"#;

const SCRIPT: &str = r#"
    <script>
        const $ = (id) => document.getElementById(id);
        let lastNotice = null;

        function updateLabel() {
            const option = $("language").selectedOptions[0];
            $("splitLengthLabel").textContent = option.dataset.label;
        }
        $("language").addEventListener("change", updateLabel);
        updateLabel();

        function render(view) {
            $("progressBar").style.width = view.progressPercent + "%";
            $("progressText").textContent = view.progressPercent + "%";
            $("currentProgress").textContent = view.progressLog;
            $("currentResult").textContent = view.currentResult;
            $("finalResult").textContent = view.finalResult;
            $("submitBtn").disabled = view.processing;
            $("stopBtn").disabled = !view.stopEnabled;
            if (view.notice && view.notice !== lastNotice && !view.processing) {
                alert(view.notice);
            }
            lastNotice = view.notice;
        }

        async function refresh() {
            const response = await fetch("/api/session");
            const view = await response.json();
            render(view);
            if (view.processing) {
                setTimeout(refresh, 1000);
            }
        }

        async function post(path, body) {
            const response = await fetch(path, {
                method: "POST",
                headers: { "Content-Type": "application/json" },
                body: JSON.stringify(body || {}),
            });
            const text = await response.text();
            let data = null;
            try {
                data = JSON.parse(text);
            } catch (_) {
                data = null;
            }
            if (!response.ok) {
                alert((data && data.error) || text || response.statusText);
                return null;
            }
            return data;
        }

        $("submitBtn").addEventListener("click", async () => {
            const started = await post("/api/session", {
                apiKey: $("apiKey").value,
                model: $("model").value,
                language: $("language").value,
                splitMethod: $("splitMethod").value,
                splitLength: $("splitLength").value,
                prompt: $("prompt").value,
                additionalText: $("additionalText").value,
            });
            if (started) {
                lastNotice = null;
                refresh();
            }
        });

        $("stopBtn").addEventListener("click", async () => {
            await post("/api/session/stop");
            refresh();
        });

        $("loadBtn").addEventListener("click", async () => {
            if (await post("/api/session/load-results")) {
                refresh();
            }
        });

        refresh();
    </script>
</body>
</html>
"#;

/// Renders the form page. The page only posts the form and polls the session
/// view; splitting and the processing loop run on the server.
pub fn render_index(models: &[String]) -> String {
    let mut html = String::from(HEAD);

    html.push_str("    <div class=\"form-group\">\n        <label for=\"language\">Language:</label>\n        <select id=\"language\">\n");
    for language in Language::ALL {
        let selected = if language == Language::default() { " selected" } else { "" };
        html.push_str(&format!(
            "            <option value=\"{}\" data-label=\"{}\"{}>{}</option>\n",
            encode_double_quoted_attribute(language.code()),
            encode_double_quoted_attribute(language.split_length_label()),
            selected,
            encode_text(language.display_name()),
        ));
    }
    html.push_str("        </select>\n    </div>\n");

    html.push_str("    <div class=\"form-group\">\n        <label for=\"model\">Model:</label>\n        <select id=\"model\">\n");
    for (idx, model) in models.iter().enumerate() {
        let selected = if idx == 0 { " selected" } else { "" };
        html.push_str(&format!(
            "            <option value=\"{}\"{}>{}</option>\n",
            encode_double_quoted_attribute(model),
            selected,
            encode_text(model),
        ));
    }
    html.push_str("        </select>\n    </div>\n");

    html.push_str(FORM_TAIL);
    html.push_str(SCRIPT);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_are_listed_and_escaped() {
        let models = vec!["deepseek/deepseek-r1:free".to_string(), "evil\"<model>".to_string()];
        let html = render_index(&models);

        assert!(html.contains(r#"<option value="deepseek/deepseek-r1:free" selected>"#));
        assert!(html.contains("evil&quot;&lt;model&gt;"));
        assert!(!html.contains("evil\"<model>"));
    }

    #[test]
    fn languages_carry_split_length_labels() {
        let html = render_index(&[]);

        assert!(html.contains(r#"value="ENG" data-label="Words per part:""#));
        assert!(html.contains(r#"value="中文" data-label="Characters per part:" selected"#));
        assert!(html.contains("Việt Nam"));
    }
}
