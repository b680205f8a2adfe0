// SPDX-License-Identifier: MPL-2.0
use schoolbell::app::{self, Flags};
use schoolbell::diagnostics;

const HELP: &str = "\
SchoolBell notification client

USAGE:
  schoolbell [OPTIONS]

OPTIONS:
  --config-dir <DIR>   Directory holding settings.toml
  --base-url <URL>     Notification service base URL
  --token <TOKEN>      Bearer token for the service
  --log <FILTER>       Tracing filter, e.g. schoolbell=debug
  -h, --help           Print this help
";

fn main() -> iced::Result {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let parsed = (|| -> Result<_, pico_args::Error> {
        Ok((
            args.opt_value_from_str::<_, String>("--config-dir")?,
            args.opt_value_from_str::<_, String>("--base-url")?,
            args.opt_value_from_str::<_, String>("--token")?,
            args.opt_value_from_str::<_, String>("--log")?,
        ))
    })();

    let (config_dir, base_url, token, log) = match parsed {
        Ok(values) => values,
        Err(err) => {
            eprintln!("error: {err}\n\n{HELP}");
            std::process::exit(2);
        }
    };

    let rest = args.finish();
    diagnostics::init_tracing(log.as_deref());
    if !rest.is_empty() {
        tracing::warn!(?rest, "ignoring unexpected arguments");
    }

    app::run(Flags {
        config_dir,
        base_url,
        token,
    })
}
