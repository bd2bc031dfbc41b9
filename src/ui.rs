use crate::calendar::{CalendarCell, CalendarView};
use crate::models::{Habit, HabitResponse, HabitStats, User};

pub fn render_login_hint() -> String {
    page("Habits", LOGIN_HINT_BODY)
}

pub fn render_habit_list(user: &User, habits: &[HabitResponse]) -> String {
    let rows = if habits.is_empty() {
        r#"<p class="empty">No habits yet. Create one with <code>POST /api/habits</code>.</p>"#.to_string()
    } else {
        habits.iter().map(habit_card).collect::<Vec<_>>().join("\n")
    };

    let body = LIST_BODY
        .replace("{{USERNAME}}", &escape(&user.username))
        .replace("{{HABITS}}", &rows);
    page("Habits", &body)
}

pub fn render_habit_page(habit: &Habit, stats: &HabitStats, view: &CalendarView) -> String {
    let mut cells = String::new();
    for _ in 0..view.first_weekday {
        cells.push_str(r#"<div class="cell blank"></div>"#);
    }
    for day in &view.days {
        let today_class = if view.today == Some(day.day) { " today" } else { "" };
        let disabled = matches!(day.state, CalendarCell::Disabled);
        cells.push_str(&format!(
            r#"<button class="cell {state}{today_class}" data-day="{day}" data-state="{state}"{attr}>{day}</button>"#,
            state = day.state.as_str(),
            day = day.day,
            attr = if disabled { " disabled" } else { "" },
        ));
    }

    let description = habit
        .description
        .as_deref()
        .map(|text| format!(r#"<p class="subtitle">{}</p>"#, escape(text)))
        .unwrap_or_default();

    let body = DETAIL_BODY
        .replace("{{NAME}}", &escape(&habit.name))
        .replace("{{COLOR}}", habit.color.as_str())
        .replace("{{DESCRIPTION}}", &description)
        .replace("{{START}}", &habit.start_date.to_string())
        .replace("{{CURRENT}}", &stats.current_streak.to_string())
        .replace("{{BEST}}", &stats.best_streak.to_string())
        .replace("{{SCORE}}", &stats.score.to_string())
        .replace("{{MONTH_NAME}}", &view.month_name)
        .replace("{{YEAR}}", &view.year.to_string())
        .replace("{{MONTH}}", &view.month.to_string())
        .replace("{{PREV_YEAR}}", &view.prev_month.year.to_string())
        .replace("{{PREV_MONTH}}", &view.prev_month.month.to_string())
        .replace("{{NEXT_YEAR}}", &view.next_month.year.to_string())
        .replace("{{NEXT_MONTH}}", &view.next_month.month.to_string())
        .replace("{{HABIT_ID}}", &habit.id.to_string())
        .replace("{{CELLS}}", &cells);
    page(&habit.name, &body)
}

fn habit_card(entry: &HabitResponse) -> String {
    format!(
        r#"<a class="habit {color}" href="/habits/{id}">
  <span class="name">{name}</span>
  <span class="metric">{score}%</span>
  <span class="metric">{current} now</span>
  <span class="metric">{best} best</span>
</a>"#,
        color = entry.habit.color.as_str(),
        id = entry.habit.id,
        name = escape(&entry.habit.name),
        score = entry.stats.score,
        current = entry.stats.current_streak,
        best = entry.stats.best_streak,
    )
}

fn page(title: &str, body: &str) -> String {
    PAGE_HTML
        .replace("{{TITLE}}", &escape(title))
        .replace("{{BODY}}", body)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            other => out.push(other),
        }
    }
    out
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --muted: #5f5c57;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
      --done: #2e9e5b;
      --not-done: #d9534f;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(760px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Georgia", serif;
      margin: 0;
    }

    .subtitle, .empty {
      margin: 0;
      color: var(--muted);
    }

    .habit {
      display: grid;
      grid-template-columns: 1fr repeat(3, auto);
      gap: 16px;
      padding: 14px 18px;
      border-radius: 16px;
      background: #fff;
      color: inherit;
      text-decoration: none;
      border-left: 6px solid var(--accent, #2f4858);
    }

    .red { --accent: #dc3545; } .blue { --accent: #0d6efd; } .green { --accent: #198754; }
    .yellow { --accent: #ffc107; } .orange { --accent: #fd7e14; } .purple { --accent: #6f42c1; }
    .pink { --accent: #d63384; } .brown { --accent: #8b5a2b; } .gray { --accent: #6c757d; }
    .black { --accent: #212529; }

    .stats {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 12px;
    }

    .stat {
      background: #fff;
      border-radius: 16px;
      padding: 14px;
      text-align: center;
    }

    .stat strong {
      display: block;
      font-size: 1.8rem;
    }

    nav.month {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
    }

    .cell {
      aspect-ratio: 1;
      border: none;
      border-radius: 12px;
      background: #fff;
      font: inherit;
      cursor: pointer;
    }

    .cell.blank { background: transparent; cursor: default; }
    .cell.disabled { opacity: 0.35; cursor: not-allowed; }
    .cell.done { background: var(--done); color: #fff; }
    .cell.not-done { background: var(--not-done); color: #fff; }
    .cell.today { outline: 3px solid var(--accent, #2f4858); }

    #status {
      min-height: 1.2em;
      color: var(--muted);
    }

    #status[data-type="error"] {
      color: var(--not-done);
    }
  </style>
</head>
<body>
  <main class="app">
{{BODY}}
  </main>
</body>
</html>
"#;

const LOGIN_HINT_BODY: &str = r#"    <header>
      <h1>Habits</h1>
      <p class="subtitle">You are not signed in. Open this page through the
        sign-in proxy, which sends your account as the <code>X-User-Id</code> header.
        New accounts are created with <code>POST /api/users</code>.</p>
    </header>"#;

const LIST_BODY: &str = r#"    <header>
      <h1>Habits</h1>
      <p class="subtitle">Signed in as {{USERNAME}}</p>
    </header>
    <section>
{{HABITS}}
    </section>"#;

const DETAIL_BODY: &str = r#"    <header class="{{COLOR}}">
      <h1>{{NAME}}</h1>
      {{DESCRIPTION}}
      <p class="subtitle">Tracking since {{START}} &middot; <a href="/">all habits</a></p>
    </header>
    <section class="stats">
      <div class="stat"><strong id="current">{{CURRENT}}</strong>current streak</div>
      <div class="stat"><strong id="best">{{BEST}}</strong>best streak</div>
      <div class="stat"><strong id="score">{{SCORE}}%</strong>last 30 days</div>
    </section>
    <nav class="month {{COLOR}}">
      <a href="?year={{PREV_YEAR}}&month={{PREV_MONTH}}">&larr;</a>
      <strong>{{MONTH_NAME}} {{YEAR}}</strong>
      <a href="?year={{NEXT_YEAR}}&month={{NEXT_MONTH}}">&rarr;</a>
    </nav>
    <section class="grid {{COLOR}}" id="grid">
{{CELLS}}
    </section>
    <p id="status"></p>
    <script>
      const habitId = {{HABIT_ID}};
      const year = {{YEAR}};
      const month = {{MONTH}};
      const statusEl = document.getElementById('status');
      const nextAction = { 'none': 'done', 'done': 'not-done', 'not-done': 'none' };

      const setStatus = (message, type) => {
        statusEl.textContent = message;
        statusEl.dataset.type = type || '';
      };

      document.querySelectorAll('#grid button.cell:not([disabled])').forEach((cell) => {
        cell.addEventListener('click', async () => {
          const action = nextAction[cell.dataset.state] || 'done';
          try {
            const res = await fetch(`/api/habits/${habitId}/calendar`, {
              method: 'POST',
              headers: { 'Content-Type': 'application/json' },
              credentials: 'same-origin',
              body: JSON.stringify({ day: Number(cell.dataset.day), month, year, action }),
            });
            const data = await res.json();
            if (!res.ok) {
              setStatus(data.message || 'Update failed', 'error');
              return;
            }
            cell.classList.remove(cell.dataset.state);
            cell.dataset.state = data.new_state;
            cell.classList.add(data.new_state);
            document.getElementById('current').textContent = data.stats.current_streak;
            document.getElementById('best').textContent = data.stats.best_streak;
            document.getElementById('score').textContent = `${data.stats.score}%`;
            setStatus('Saved');
          } catch (err) {
            setStatus('Network error', 'error');
          }
        });
      });
    </script>"#;
