//! Splitting a launcher command line into launcher options and the user
//! program, and finding the hosts it will run on.
//!
//! The flag table is a fixed heuristic: an unlisted flag that does take a
//! value will have that value mistaken for the start of the program.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;

const ONE_ARG_FLAGS: &[&str] = &[
    "-H",
    "-host",
    "--host",
    "-machinefile",
    "--machinefile",
    "-hostfile",
    "--hostfile",
    "-c",
    "-n",
    "--n",
    "-np",
    "-npersocker",
    "--npersocker",
    "-npernode",
    "--npernode",
    "--map-by",
    "--rank-by",
    "--bind-to",
    "-cpus-per-proc",
    "--cpus-per-proc",
    "-cpus-per-rank",
    "--cpus-per-rank",
    "-slot-list",
    "--slot-list",
    "-rf",
    "--rankfile",
    "-output-filename",
    "--output-filename",
    "-stdin",
    "--stdin",
    "-xterm",
    "--xterm",
    "-path",
    "--path",
    "--prefix",
    "--preload-files",
    "--preload-files-dest-dir",
    "--tmpdir",
    "-wd",
    "-wdir",
    "-x",
    "-tune",
    "--tune",
    "-aborted",
    "--aborted",
    "--app",
    "-cf",
    "--cartofile",
    "-ompi-server",
    "--ompi-server",
    "-report-pid",
    "--report-pid",
    "-report-uri",
    "--report-uri",
    "-server-wait-time",
    "--server-wait-time",
];

const TWO_ARG_FLAGS: &[&str] = &["--gmca", "--mca"];

const HOST_LIST_FLAGS: &[&str] = &["-H", "-host", "--host"];

static HOST_FILE_FLAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^--?(machine|host)file$").unwrap());

fn arity(token: &str) -> usize {
    if ONE_ARG_FLAGS.contains(&token) {
        1
    } else if TWO_ARG_FLAGS.contains(&token) {
        2
    } else {
        0
    }
}

/// `(launcher_args, program_and_args)`.
pub fn split_launcher_args<S: AsRef<str>>(tokens: &[S]) -> Result<(Vec<String>, Vec<String>)> {
    let mut idx = 0;
    while idx < tokens.len() {
        let token = tokens[idx].as_ref();
        if !token.starts_with('-') {
            break;
        }
        let n = arity(token);
        if idx + n >= tokens.len() {
            return Err(Error::MalformedLaunchArgs {
                flag: token.to_string(),
            });
        }
        idx += 1 + n;
    }

    let owned = |s: &[S]| s.iter().map(|t| t.as_ref().to_string()).collect::<Vec<_>>();
    Ok((owned(&tokens[..idx]), owned(&tokens[idx..])))
}

enum HostSource<'a> {
    File(&'a str),
    List(&'a str),
}

fn host_sources<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<HostSource<'_>>> {
    let mut sources = Vec::new();
    let mut iter = tokens.iter().map(|t| AsRef::<str>::as_ref(t));
    while let Some(token) = iter.next() {
        let is_file = HOST_FILE_FLAG.is_match(token);
        let is_list = HOST_LIST_FLAGS.contains(&token);
        if !is_file && !is_list {
            continue;
        }
        let value = iter.next().ok_or_else(|| Error::MalformedLaunchArgs {
            flag: token.to_string(),
        })?;
        sources.push(if is_file {
            HostSource::File(value)
        } else {
            HostSource::List(value)
        });
    }
    Ok(sources)
}

fn host_name(entry: &str) -> &str {
    let entry = entry.split('#').next().unwrap_or_default();
    let entry = entry.split(':').next().unwrap_or_default();
    entry.split_whitespace().next().unwrap_or_default()
}

/// Hosts named in a host file, one per non-blank line.
pub fn read_hostfile(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(text
        .lines()
        .map(host_name)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect())
}

/// Sorted, deduplicated hosts; `["localhost"]` when none are named.
///
/// Every flag is checked for its value before any host file is read.
pub fn parse_hosts<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<String>> {
    let sources = host_sources(tokens)?;

    let mut hosts = BTreeSet::new();
    for source in sources {
        match source {
            HostSource::File(path) => hosts.extend(read_hostfile(Path::new(path))?),
            HostSource::List(list) => hosts.extend(
                list.split(',')
                    .map(host_name)
                    .filter(|h| !h.is_empty())
                    .map(str::to_string),
            ),
        }
    }

    if hosts.is_empty() {
        return Ok(vec!["localhost".to_string()]);
    }
    Ok(hosts.into_iter().collect())
}

pub fn is_local_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1")
}

/// Quote arguments for a `sh` command line the way users typed them.
pub fn escape_shell_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            if arg.contains('"') {
                format!("\"{}\"", arg.replace('"', "\\\""))
            } else if arg
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '\'' | '[' | ']' | '*'))
            {
                format!("\"{arg}\"")
            } else {
                arg.to_string()
            }
        })
        .collect()
}
