use kclique::graph::Graph;
use kclique::session::run_recorded_search;
use kclique::sink::{NoopSink, TextSink};
use kclique::store::{SessionId, SessionStore};

enum Mode {
    Search,
    History,
    Stats,
    Show(i64),
    Clear,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut mode = Mode::Search;
    let mut graph_path: Option<String> = None;
    let mut k: Option<usize> = None;
    let mut db_path = String::from("clique_sessions.db");
    let mut verbose = false;
    let mut no_save = false;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--graph" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                graph_path = Some(v.clone());
                i += 2;
            }
            "--k" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                k = Some(v.parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--db" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                db_path = v.clone();
                i += 2;
            }
            "--verbose" => {
                verbose = true;
                i += 1;
            }
            "--no-save" => {
                no_save = true;
                i += 1;
            }
            "--history" => {
                mode = Mode::History;
                i += 1;
            }
            "--stats" => {
                mode = Mode::Stats;
                i += 1;
            }
            "--show" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                mode = Mode::Show(v.parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--clear" => {
                mode = Mode::Clear;
                i += 1;
            }
            "--help" | "-h" => usage_and_exit(0),
            _ => usage_and_exit(2),
        }
    }

    match mode {
        Mode::Search => run_search_mode(graph_path, k, &db_path, verbose, no_save),
        Mode::History => run_history_mode(&db_path),
        Mode::Stats => run_stats_mode(&db_path),
        Mode::Show(id) => run_show_mode(&db_path, id),
        Mode::Clear => run_clear_mode(&db_path),
    }
}

fn run_search_mode(
    graph_path: Option<String>,
    k: Option<usize>,
    db_path: &str,
    verbose: bool,
    no_save: bool,
) {
    let (Some(graph_path), Some(k)) = (graph_path, k) else {
        usage_and_exit(2);
    };

    let graph = match Graph::load_from_file(&graph_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Failed to load graph from {graph_path}: {e}");
            std::process::exit(1);
        }
    };

    let outcome = if verbose {
        let stdout = std::io::stdout();
        let mut sink = TextSink::new(stdout.lock());
        run_recorded_search(&graph, k, &mut sink)
    } else {
        run_recorded_search(&graph, k, &mut NoopSink)
    };

    let (result, record) = match outcome {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    println!("--------------------------------------------------");
    println!(
        "Clique search: n={} k={} | {}",
        record.vertex_count,
        k,
        if result.found { "FOUND" } else { "not found" }
    );
    if result.found {
        println!("Clique vertices: {:?}", result.clique);
    }
    println!(
        "Steps: {} | Time: {:.6}s",
        result.total_steps, record.execution_time_seconds
    );

    if !no_save {
        match open_store(db_path).save_session(&record) {
            Ok(id) => println!("Saved as session {}", id.0),
            Err(e) => {
                eprintln!("Failed to save session: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn run_history_mode(db_path: &str) {
    let store = open_store(db_path);
    let sessions = match store.all_sessions() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read history: {e}");
            std::process::exit(1);
        }
    };

    if sessions.is_empty() {
        println!("No stored sessions.");
        return;
    }

    println!("{:>5}  {:<25} {:>3} {:>3}  {:<9} {:>8}  {:>10}", "id", "timestamp", "n", "k", "result", "steps", "time (s)");
    for s in sessions {
        println!(
            "{:>5}  {:<25} {:>3} {:>3}  {:<9} {:>8}  {:>10.6}",
            s.id.0,
            s.timestamp.to_rfc3339(),
            s.vertex_count,
            s.target_k,
            if s.found { "found" } else { "not found" },
            s.total_steps,
            s.execution_time_seconds,
        );
    }
}

fn run_stats_mode(db_path: &str) {
    let store = open_store(db_path);
    let stats = match store.statistics() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to compute statistics: {e}");
            std::process::exit(1);
        }
    };

    println!("Total searches:      {}", stats.total_searches);
    println!("Successful searches: {}", stats.successful_searches);
    println!("Success rate:        {:.1}%", stats.success_rate * 100.0);
    println!("Average steps:       {:.2}", stats.avg_steps);
    println!("Average time:        {:.6}s", stats.avg_time_seconds);
    println!("Max steps:           {}", stats.max_steps);
    println!("Max time:            {:.6}s", stats.max_time_seconds);
}

fn run_show_mode(db_path: &str, id: i64) {
    let store = open_store(db_path);
    match store.session_by_id(SessionId(id)) {
        Ok(Some(record)) => {
            println!("Session {id} at {}", record.timestamp.to_rfc3339());
            println!(
                "n={} k={} | {}",
                record.vertex_count,
                record.target_k,
                if record.found { "FOUND" } else { "not found" }
            );
            if let Some(clique) = &record.clique_vertices {
                println!("Clique vertices: {clique:?}");
            }
            println!(
                "Steps: {} | Time: {:.6}s",
                record.total_steps, record.execution_time_seconds
            );
            println!("Adjacency matrix:");
            for row in &record.graph_matrix {
                let line: String = row.iter().map(|&e| if e == 0 { '0' } else { '1' }).collect();
                println!("{line}");
            }
        }
        Ok(None) => {
            eprintln!("No session with id {id}.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to load session {id}: {e}");
            std::process::exit(1);
        }
    }
}

fn run_clear_mode(db_path: &str) {
    match open_store(db_path).clear_all() {
        Ok(deleted) => println!("Deleted {deleted} stored sessions."),
        Err(e) => {
            eprintln!("Failed to clear store: {e}");
            std::process::exit(1);
        }
    }
}

fn open_store(db_path: &str) -> SessionStore {
    match SessionStore::open(db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open session store at {db_path}: {e}");
            std::process::exit(1);
        }
    }
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  kclique --graph FILE --k K [--db PATH] [--verbose] [--no-save]\n  kclique --history [--db PATH]\n  kclique --stats [--db PATH]\n  kclique --show ID [--db PATH]\n  kclique --clear [--db PATH]\n\nOptions:\n  --graph FILE   Adjacency matrix file: one row of 0/1 characters per line\n  --k K          Target clique size (>= 1)\n  --db PATH      Session store path (default: clique_sessions.db)\n  --verbose      Narrate every search step\n  --no-save      Do not record the search in the session store\n  --history      List stored sessions, newest first\n  --stats        Print aggregate statistics over stored sessions\n  --show ID      Print one stored session, including its matrix\n  --clear        Delete every stored session\n"
    );
    std::process::exit(code)
}
