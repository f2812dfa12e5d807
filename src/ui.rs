use crate::models::Athlete;

pub fn render_dashboard(athlete: Option<&Athlete>) -> String {
    let (id, name, goal) = match athlete {
        Some(athlete) => (
            athlete.id.to_string(),
            athlete.display_name(),
            format!("{:.2}", athlete.mileage_goal),
        ),
        None => (String::new(), "No athlete yet".to_string(), "0.00".to_string()),
    };

    DASHBOARD_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{ATHLETE_ID}}", &id)
        .replace("{{ATHLETE_NAME}}", &escape_html(&name))
        .replace("{{GOAL}}", &goal)
}

pub fn render_register() -> String {
    REGISTER_HTML.replace("{{STYLE}}", STYLE)
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const STYLE: &str = r#"
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef4ef;
      --bg-2: #b9dcc4;
      --ink: #24302a;
      --accent: #e4572e;
      --accent-2: #29524a;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(41, 82, 74, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3f1e6 60%, #f4f8f4 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
      animation: rise 600ms ease;
    }

    header {
      display: flex;
      flex-direction: column;
      gap: 6px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5b6660;
      font-size: 1rem;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(41, 82, 74, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7f8a84;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .value.remaining {
      color: var(--accent);
    }

    select, input {
      font: inherit;
      padding: 10px 14px;
      border-radius: 12px;
      border: 1px solid rgba(41, 82, 74, 0.2);
      background: white;
      color: var(--ink);
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: white;
      border-radius: 20px;
      overflow: hidden;
    }

    th, td {
      padding: 12px 16px;
      text-align: left;
      border-bottom: 1px solid rgba(41, 82, 74, 0.08);
    }

    th {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7f8a84;
    }

    .mileage-value {
      font-weight: 600;
      color: var(--accent-2);
    }

    .mileage-value.empty {
      color: #a3aca7;
    }

    tfoot td {
      font-weight: 600;
    }

    form.register {
      display: grid;
      gap: 14px;
    }

    form.register label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      color: #5b6660;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 16px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
      box-shadow: 0 10px 24px rgba(41, 82, 74, 0.3);
      transition: transform 150ms ease;
    }

    button:active {
      transform: scale(0.98);
    }

    .status {
      font-size: 0.95rem;
      color: #5b6660;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .hint {
      margin: 0;
      color: #67716b;
      font-size: 0.9rem;
    }

    a {
      color: var(--accent-2);
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
    }
"#;

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mileage Tracker</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app" data-athlete="{{ATHLETE_ID}}">
    <header>
      <h1>Weekly Mileage</h1>
      <p class="subtitle"><span id="athleteName">{{ATHLETE_NAME}}</span> &middot; goal <span id="goalDisplay">{{GOAL}}</span> mi &middot; <a href="/register">register</a></p>
    </header>

    <section class="panel">
      <div class="stat">
        <span class="label">Weekly goal</span>
        <span id="goalValue" class="value">{{GOAL}}</span>
      </div>
      <div class="stat">
        <span class="label">Completed</span>
        <span id="completedMileage" class="value">0.00</span>
      </div>
      <div class="stat">
        <span class="label">Remaining</span>
        <span id="remainingMileage" class="value remaining">{{GOAL}}</span>
      </div>
    </section>

    <section>
      <label for="weekSelect" class="hint">Week</label>
      <select id="weekSelect"></select>
    </section>

    <table>
      <thead>
        <tr><th>Day</th><th>Date</th><th>Miles</th></tr>
      </thead>
      <tbody id="mileageTableBody">
        <tr><td>Monday</td><td></td><td class="mileage-value empty">--</td></tr>
        <tr><td>Tuesday</td><td></td><td class="mileage-value empty">--</td></tr>
        <tr><td>Wednesday</td><td></td><td class="mileage-value empty">--</td></tr>
        <tr><td>Thursday</td><td></td><td class="mileage-value empty">--</td></tr>
        <tr><td>Friday</td><td></td><td class="mileage-value empty">--</td></tr>
        <tr><td>Saturday</td><td></td><td class="mileage-value empty">--</td></tr>
        <tr><td>Sunday</td><td></td><td class="mileage-value empty">--</td></tr>
      </tbody>
      <tfoot>
        <tr><td>Total</td><td></td><td id="totalMileage">0.00</td></tr>
      </tfoot>
    </table>

    <div class="status" id="status"></div>
    <p class="hint">Weeks run Monday to Sunday. Distances are in miles.</p>
  </main>

  <script>
    const DAYS = ['Monday', 'Tuesday', 'Wednesday', 'Thursday', 'Friday', 'Saturday', 'Sunday'];
    const athleteId = document.querySelector('.app').dataset.athlete;
    const statusEl = document.getElementById('status');
    const weekSelect = document.getElementById('weekSelect');
    const tableBody = document.getElementById('mileageTableBody');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const formatDate = (iso) => {
      const date = new Date(iso + 'T00:00:00');
      return date.toLocaleDateString('en-US', { month: 'short', day: 'numeric', year: 'numeric' });
    };

    const populateTable = (week) => {
      DAYS.forEach((day, index) => {
        const row = tableBody.rows[index];
        row.cells[1].textContent = week.dates[index] ? formatDate(week.dates[index]) : '';
        const mileage = week.daily_mileage[day] || 0;
        const cell = row.cells[2];
        if (mileage > 0) {
          cell.textContent = mileage.toFixed(2);
          cell.className = 'mileage-value';
        } else {
          cell.textContent = '--';
          cell.className = 'mileage-value empty';
        }
      });

      document.getElementById('totalMileage').textContent = week.total.toFixed(2);
      document.getElementById('goalValue').textContent = week.goal.toFixed(2);
      document.getElementById('goalDisplay').textContent = week.goal.toFixed(2);
      document.getElementById('completedMileage').textContent = week.total.toFixed(2);
      document.getElementById('remainingMileage').textContent = week.remaining.toFixed(2);
    };

    const loadWeek = async () => {
      const params = new URLSearchParams({ start: weekSelect.value || 'current' });
      if (athleteId) {
        params.set('athlete', athleteId);
      }
      const res = await fetch(`/api/week?${params}`);
      if (!res.ok) {
        const body = await res.json().catch(() => ({}));
        throw new Error(body.error || `HTTP error ${res.status}`);
      }
      populateTable(await res.json());
      setStatus('', '');
    };

    const loadWeeks = async () => {
      const res = await fetch('/api/weeks');
      if (!res.ok) {
        throw new Error(`HTTP error ${res.status}`);
      }
      const options = await res.json();
      options.forEach((week) => {
        const option = document.createElement('option');
        option.value = week.value;
        option.textContent = week.label;
        weekSelect.appendChild(option);
      });
    };

    const initialize = async () => {
      setStatus('Loading mileage...', 'info');
      await loadWeeks();
      weekSelect.addEventListener('change', () => {
        loadWeek().catch((err) => setStatus(`Error displaying week data: ${err.message}.`, 'error'));
      });
      await loadWeek();
    };

    initialize().catch((err) => setStatus(`Error loading data: ${err.message}. Is the backend running?`, 'error'));
  </script>
</body>
</html>
"##;

const REGISTER_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Register &middot; Mileage Tracker</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Register</h1>
      <p class="subtitle">Create an athlete profile and set your weekly goals.</p>
    </header>

    <form id="registerForm" class="register" method="post" action="/register">
      <label>Username <input id="username" name="username" required /></label>
      <label>First name <input name="first_name" /></label>
      <label>Last name <input name="last_name" /></label>
      <label>Gender
        <select name="gender">
          <option value="O">Other</option>
          <option value="F">Female</option>
          <option value="M">Male</option>
        </select>
      </label>
      <label>Weekly mileage goal <input name="mileage_goal" type="number" min="0" step="0.1" /></label>
      <label>Long run goal <input name="long_run_goal" type="number" min="0" step="0.1" /></label>
      <button type="submit">Create profile</button>
    </form>

    <div class="status" id="status"></div>
  </main>

  <script>
    const form = document.getElementById('registerForm');
    const statusEl = document.getElementById('status');

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      statusEl.textContent = '';
      statusEl.dataset.type = '';

      const res = await fetch('/register', {
        method: 'POST',
        body: new URLSearchParams(new FormData(form)),
        headers: { 'X-Requested-With': 'XMLHttpRequest' },
        redirect: 'follow'
      }).catch(() => null);

      if (res && (res.redirected || res.ok)) {
        window.location.href = res.url || '/';
        return;
      }

      let message = 'Registration failed. Please try again.';
      if (res && (res.headers.get('content-type') || '').includes('application/json')) {
        const body = await res.json().catch(() => ({}));
        message = body.error || message;
      }
      statusEl.textContent = `Error: ${message}`;
      statusEl.dataset.type = 'error';
    });
  </script>
</body>
</html>
"##;
