use crate::progression::{ProgressionError, TrackRegistry};
use crate::server::api::{self, PayloadError};

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

pub fn route_request(registry: &TrackRegistry, method: &str, path: &str, body: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
        },
        ("GET", "/api/health") => match api::health_payload(registry) {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/tracks") => match api::tracks_payload(registry) {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", route) if route.starts_with("/api/tracks/") => {
            let id = route.trim_start_matches("/api/tracks/").split('/').next().unwrap_or("");
            payload_response(api::track_payload(registry, id))
        }
        ("GET", "/api/data/version") => match api::data_version_payload(registry) {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/calculate") => payload_response(api::calculate_query_payload(registry, path)),
        ("POST", "/api/calculate") => payload_response(api::calculate_payload(registry, body)),
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn json_ok(payload: String) -> HttpResponse {
    HttpResponse {
        status_code: 200,
        status_text: "OK",
        content_type: "application/json",
        body: payload,
    }
}

fn payload_response(result: Result<String, PayloadError>) -> HttpResponse {
    match result {
        Ok(payload) => json_ok(payload),
        Err(PayloadError::Parse(err)) => {
            error_response(400, "Bad Request", &format!("Invalid request: {err}"))
        }
        Err(PayloadError::Validation(validation)) => {
            validation_error_response(400, "Bad Request", validation)
        }
        Err(PayloadError::Engine(err @ ProgressionError::UnknownTrack(_))) => {
            error_response(404, "Not Found", &err.to_string())
        }
        Err(PayloadError::Engine(err)) if err.is_caller_recoverable() => {
            error_response(400, "Bad Request", &err.to_string())
        }
        Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
    }
}

fn validation_error_response(
    status_code: u16,
    status_text: &'static str,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Frostguide Upgrade Calculator</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 900px; margin: 24px auto; padding: 0 12px; }
    h1 { margin-bottom: 8px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    label { display:block; margin: 8px 0 4px; font-weight: 600; }
    input, select { width: 100%; padding: 8px; box-sizing: border-box; }
    button { margin-top: 12px; padding: 8px 14px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; min-height: 180px; }
  </style>
</head>
<body>
  <h1>Frostguide Local API</h1>
  <p>Upgrade cost and bonus lookups for gear, charm and building tracks.</p>

  <div class="card">
    <strong>Calculate</strong>
    <label for="track">Track</label>
    <select id="track"></select>
    <label for="from">From</label>
    <select id="from"></select>
    <label for="to">To</label>
    <select id="to"></select>
    <label for="quantity">Quantity</label>
    <input id="quantity" type="number" min="1" value="1" />
    <div><button id="calculate-btn">POST /api/calculate</button></div>
  </div>

  <pre id="output">Ready.</pre>

  <script>
    const output = document.getElementById('output');
    const trackEl = document.getElementById('track');
    const fromEl = document.getElementById('from');
    const toEl = document.getElementById('to');
    const quantityEl = document.getElementById('quantity');

    function fill(select, levels, selected) {
      select.innerHTML = '';
      levels.forEach(level => {
        const opt = document.createElement('option');
        opt.value = level;
        opt.textContent = level;
        select.appendChild(opt);
      });
      select.value = selected;
    }

    async function loadTrack(id) {
      const detail = await fetch('/api/tracks/' + encodeURIComponent(id)).then(r => r.json());
      fill(fromEl, detail.levels, detail.levels[0]);
      fill(toEl, detail.levels, detail.levels[detail.levels.length - 1]);
      quantityEl.max = detail.max_quantity;
    }

    fetch('/api/tracks').then(r => r.json()).then(tracks => {
      tracks.forEach(t => {
        const opt = document.createElement('option');
        opt.value = t.id;
        opt.textContent = t.name;
        trackEl.appendChild(opt);
      });
      if (tracks.length) loadTrack(tracks[0].id);
    });
    trackEl.addEventListener('change', () => loadTrack(trackEl.value));

    document.getElementById('calculate-btn').addEventListener('click', async () => {
      output.textContent = 'Loading…';
      const payload = {
        track: trackEl.value,
        from: fromEl.value,
        to: toEl.value,
        quantity: Math.max(1, Number(quantityEl.value) || 1),
      };
      const response = await fetch('/api/calculate', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(payload),
      });
      output.textContent = 'HTTP ' + response.status + '\n' + await response.text();
    });
  </script>
</body>
</html>
"#
    .to_string()
}
