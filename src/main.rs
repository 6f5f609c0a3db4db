// algoscope: step-through algorithm visualizer

use std::error::Error;
use std::fs;
use std::io;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use algoscope::config::{init_tracing, Cli, Commands, OutputArgs, ProblemArgs};
use algoscope::instrument::ExecutionLimits;
use algoscope::playback::PlaybackController;
use algoscope::registry::{self, ResolvedProblem};
use algoscope::snapshot::Trace;
use algoscope::ui::App;

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    match cli.command {
        Commands::List { search } => list(search.as_deref()),
        Commands::Trace { problem, output } => trace(&problem, &output),
        Commands::Run {
            problem,
            code,
            output,
        } => {
            let source = fs::read_to_string(&code)?;
            run(&problem, &source, &output)
        }
        Commands::View { problem, code } => {
            let source = code.map(fs::read_to_string).transpose()?;
            view(&problem, source)
        }
    }
}

fn list(search: Option<&str>) -> Result<(), Box<dyn Error>> {
    let routes = registry::search(search.unwrap_or(""));
    tracing::info!(count = routes.len(), query = search.unwrap_or(""), "Listing problems");
    for route in routes {
        let meta = &route.problem.meta;
        let runnable = if meta.entry_point.is_some() { "  [run]" } else { "" };
        println!(
            "{:<50} {:<28} {:<7}{}",
            route.route(),
            meta.title,
            meta.difficulty.to_string(),
            runnable
        );
    }
    Ok(())
}

fn resolve(args: &ProblemArgs) -> Result<ResolvedProblem, Box<dyn Error>> {
    registry::resolve(&args.topic, &args.pattern, &args.problem).ok_or_else(|| {
        format!(
            "No visualizer for /{}/{}/{} (try `algoscope list`)",
            args.topic, args.pattern, args.problem
        )
        .into()
    })
}

fn controller_for(args: &ProblemArgs) -> Result<PlaybackController, Box<dyn Error>> {
    let problem = resolve(args)?;
    let inputs = args.resolve_inputs(problem.meta())?;
    let mut controller = PlaybackController::new(Some(problem));
    if args.inputs.is_some() {
        controller.load(inputs);
    }
    Ok(controller)
}

fn print_trace(trace: &Trace, output: &OutputArgs) -> Result<(), Box<dyn Error>> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(trace)?);
        return Ok(());
    }
    let shown = output.max_steps.unwrap_or(usize::MAX);
    for (i, snapshot) in trace.iter().enumerate().take(shown) {
        let action = snapshot.action.map(|a| format!(" <{}>", a)).unwrap_or_default();
        println!(
            "{:>4}. [{}]{} {}",
            i + 1,
            snapshot.mode().as_str(),
            action,
            snapshot.message
        );
    }
    if trace.len() > shown {
        println!("      ... {} more steps", trace.len() - shown);
    }
    Ok(())
}

fn trace(args: &ProblemArgs, output: &OutputArgs) -> Result<(), Box<dyn Error>> {
    let controller = controller_for(args)?;
    let trace = controller
        .trace()
        .ok_or("The generator produced no trace")?;
    tracing::info!(steps = trace.len(), problem = %args.problem, "Generated trace");
    print_trace(trace, output)
}

fn run(args: &ProblemArgs, source: &str, output: &OutputArgs) -> Result<(), Box<dyn Error>> {
    let mut controller = controller_for(args)?;
    let steps = controller.run_instrumented(source, &output.execution_limits())?;
    tracing::info!(steps, problem = %args.problem, "Recorded trace from user code");
    let trace = controller
        .trace()
        .ok_or("Instrumented execution produced no trace")?;
    print_trace(trace, output)
}

fn view(args: &ProblemArgs, user_code: Option<String>) -> Result<(), Box<dyn Error>> {
    let controller = controller_for(args)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller, user_code, ExecutionLimits::default());
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}
