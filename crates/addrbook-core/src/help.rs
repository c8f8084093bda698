//! Static help text shared by the session loop and the CLI usage screen

/// One line per interactive command
pub const COMMAND_SUMMARY: &str = "
list ([filter])                  List all addresses matching the (optional) filter.
add ([data])                     Add an entry. If you don't provide [data] (in json format),
                                 this initiates an interactive questionnaire.
delete [filter]                  Delete all entries matching filter.
count [filter]                   Count the entries matching filter.
write                            Save the current data
quit                             Save and exit
";

/// Explanation of filter syntax, appended to the usage screen
pub const FILTER_HELP: &str = "
FILTERS

An asterisk (*) matches every entry. A JSON object such as {\"city\":\"Oslo\"} matches
entries whose fields equal the given values (fields an entry lacks are ignored). Anything
else is a regular expression searched for in each entry's name and address.
";
