use std::any::Any;
use std::panic;

use pgsb::cli::run;

fn install_broken_pipe_handler() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let is_broken = <dyn Any>::downcast_ref::<&str>(payload)
            .is_some_and(|s| s.contains("Broken pipe"))
            || <dyn Any>::downcast_ref::<String>(payload)
                .is_some_and(|s| s.contains("Broken pipe"));

        if is_broken {
            // `pgsb pgenv | head` closing the pipe is not a failure.
            std::process::exit(0);
        }

        default_hook(info);
    }));
}

fn main() {
    install_broken_pipe_handler();

    let args: Vec<String> = std::env::args().skip(1).collect();
    std::process::exit(run(&args));
}
