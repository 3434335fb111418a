use clap::Parser;

#[derive(Parser)]
#[command(name = "clrbridge")]
#[command(about = "Show the .NET runtimes loaded in this process and run a callback in an AppDomain")]
struct Cli {
    /// Enable debug logging of the discovery steps
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    #[cfg(windows)]
    run();

    #[cfg(not(windows))]
    {
        eprintln!("clrbridge requires the Windows runtime-hosting service");
        std::process::exit(1);
    }
}

#[cfg(windows)]
extern "system" fn hello_from_domain(_args: *mut std::ffi::c_void) {
    println!("Hello World from a .NET AppDomain!");
}

#[cfg(windows)]
fn run() {
    use clrbridge::ClrContext;

    let mut ctx = ClrContext::new();
    if !ctx.init() {
        eprintln!("Error: could not attach to the CLR hosting service");
        std::process::exit(1);
    }

    if ctx.is_loaded() {
        let runtime = &ctx.runtimes()[0];

        match runtime.version() {
            Ok(version) => println!("-- First .NET runtime is version {} --", version),
            Err(e) => eprintln!("Failed to read runtime version: {}", e),
        }

        match runtime.current_domain_id() {
            Ok(domain_id) => {
                println!("-- Executing on AppDomain {} --", domain_id);
                if let Err(e) =
                    runtime.execute_in_domain(domain_id, hello_from_domain, std::ptr::null_mut())
                {
                    eprintln!("Cross-domain execution failed: {}", e);
                }
            }
            Err(e) => eprintln!("Failed to query current AppDomain: {}", e),
        }
    } else {
        println!("-- No .NET runtime loaded --");
        println!("Hello world from the native domain!");
    }

    ctx.uninit();
}
