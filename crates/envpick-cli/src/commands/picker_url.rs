use crate::cli::RequestArgs;
use crate::support::{print_json_or_exit, request_from_args};
use envpick_context::NegotiationConfig;
use serde_json::json;

pub fn run(config: &NegotiationConfig, args: RequestArgs, json_output: bool) {
    let request = request_from_args(args);
    let picker_url = config.picker_url_for(&request);

    if json_output {
        print_json_or_exit(
            "picker-url",
            &json!({
                "pickerUrl": picker_url,
                "frameTitle": config.frame_title,
                "request": request,
            }),
        );
    } else {
        println!("{picker_url}");
    }
}
