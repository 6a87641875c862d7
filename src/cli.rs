// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn post_id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .help("Post id")
}

fn comment_id_arg() -> Arg {
    Arg::new("comment")
        .long("comment")
        .required(true)
        .help("Comment id")
}

pub fn build_cli() -> Command {
    Command::new("stocknote")
        .version(crate_version!())
        .about("Stock Note: community posts, notifications and portfolios from the terminal")
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("API base URL (overrides STOCKNOTE_API_BASE_URL)"),
        )
        .subcommand(
            Command::new("login")
                .about("Store an access token obtained from the OAuth login")
                .arg(Arg::new("token").long("token").required(true))
                .arg(Arg::new("member-id").long("member-id"))
                .arg(Arg::new("name").long("name").requires("member-id"))
                .arg(Arg::new("profile").long("profile").requires("member-id")),
        )
        .subcommand(
            Command::new("login-url")
                .about("Print the OAuth login URL for a provider")
                .arg(
                    Arg::new("provider")
                        .long("provider")
                        .default_value("google")
                        .help("google|kakao"),
                ),
        )
        .subcommand(Command::new("logout").about("Forget the stored session"))
        .subcommand(Command::new("whoami").about("Show the stored session"))
        .subcommand(
            Command::new("notifications")
                .about("Comment-activity and keyword notifications")
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("kind").long("kind").help("comment|keyword"))
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Include notifications already read"),
                        ),
                ))
                .subcommand(
                    Command::new("read")
                        .about("Mark a notification read")
                        .arg(Arg::new("kind").long("kind").required(true))
                        .arg(Arg::new("id").long("id").required(true)),
                )
                .subcommand(
                    Command::new("watch")
                        .about("Stream notifications as they arrive")
                        .arg(
                            Arg::new("seconds")
                                .long("seconds")
                                .value_parser(value_parser!(u64))
                                .help("Stop after this many seconds"),
                        ),
                ),
        )
        .subcommand(
            Command::new("article")
                .about("Community articles")
                .subcommand(json_flags(Command::new("show").arg(post_id_arg())))
                .subcommand(Command::new("like").arg(post_id_arg()))
                .subcommand(
                    Command::new("comment")
                        .subcommand(
                            Command::new("add")
                                .arg(post_id_arg())
                                .arg(Arg::new("body").long("body").required(true)),
                        )
                        .subcommand(
                            Command::new("edit")
                                .arg(post_id_arg())
                                .arg(comment_id_arg())
                                .arg(Arg::new("body").long("body").required(true)),
                        )
                        .subcommand(Command::new("rm").arg(post_id_arg()).arg(comment_id_arg())),
                )
                .subcommand(
                    Command::new("delete").arg(post_id_arg()).arg(
                        Arg::new("yes")
                            .long("yes")
                            .action(ArgAction::SetTrue)
                            .help("Skip the confirmation prompt"),
                    ),
                )
                .subcommand(json_flags(
                    Command::new("search")
                        .arg(Arg::new("keyword").long("keyword").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("all")
                                .help("all|title|body|hashtag|author"),
                        ),
                )),
        )
        .subcommand(
            Command::new("portfolio")
                .about("Portfolios and their totals")
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("description")
                                .long("description")
                                .default_value(""),
                        ),
                ),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("portfolios")
                    .arg(Arg::new("format").long("format").required(true))
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(Command::new("header").about("Render the header and footer"))
        .subcommand(Command::new("doctor").about("Check configuration and session"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn global_base_url_reaches_subcommands() {
        let m = build_cli().get_matches_from([
            "stocknote",
            "portfolio",
            "list",
            "--base-url",
            "http://example.test",
        ]);
        assert_eq!(
            m.get_one::<String>("base-url").map(String::as_str),
            Some("http://example.test")
        );
    }
}
