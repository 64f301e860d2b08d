//! SCPD (service description) parsing.
//!
//! Streaming parse in the same style as the device description parser:
//! track the enclosing `<action>`/`<argument>` elements and collect text
//! by the last opened tag.

use std::io::BufReader;

use quick_xml::{Error as XmlError, Reader, events::Event};
use tracing::debug;

/// One action declared by a service description, with its argument names
/// split by direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScpdAction {
    pub name: String,
    pub in_args: Vec<String>,
    pub out_args: Vec<String>,
}

/// Parse an SCPD document into its action list.
///
/// A document without an `<actionList>` (or with an empty one) parses to an
/// empty list, never an error. Arguments with a direction other than
/// `in`/`out` are excluded from both lists.
pub fn parse_scpd(xml: &[u8]) -> Result<Vec<ScpdAction>, quick_xml::Error> {
    let mut reader = Reader::from_reader(BufReader::new(xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut actions = Vec::new();

    let mut in_action = false;
    let mut in_argument = false;
    let mut current_tag: Option<String> = None;

    let mut action_name: Option<String> = None;
    let mut in_args: Vec<String> = Vec::new();
    let mut out_args: Vec<String> = Vec::new();

    let mut arg_name: Option<String> = None;
    let mut arg_direction: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "action" => {
                        in_action = true;
                        action_name = None;
                        in_args.clear();
                        out_args.clear();
                        current_tag = None;
                    }
                    "argument" => {
                        if in_action {
                            in_argument = true;
                            arg_name = None;
                            arg_direction = None;
                            current_tag = None;
                        }
                    }
                    _ => {
                        current_tag = Some(name);
                    }
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "argument" => {
                        if in_argument {
                            if let Some(arg) = arg_name.take() {
                                match arg_direction.as_deref() {
                                    Some("in") => in_args.push(arg),
                                    Some("out") => out_args.push(arg),
                                    other => {
                                        debug!(
                                            argument = arg.as_str(),
                                            direction = other.unwrap_or(""),
                                            "skipping argument with unrecognized direction"
                                        );
                                    }
                                }
                            }
                            in_argument = false;
                        }
                    }
                    "action" => {
                        if in_action {
                            if let Some(name) = action_name.take() {
                                actions.push(ScpdAction {
                                    name,
                                    in_args: std::mem::take(&mut in_args),
                                    out_args: std::mem::take(&mut out_args),
                                });
                            }
                            in_action = false;
                        }
                    }
                    _ => {}
                }
                current_tag = None;
            }
            Event::Text(e) => {
                if let Some(tag) = &current_tag {
                    let text = e.decode().map_err(XmlError::Encoding)?.into_owned();
                    if in_argument {
                        match tag.as_str() {
                            "name" => arg_name = Some(text),
                            "direction" => arg_direction = Some(text),
                            _ => {}
                        }
                    } else if in_action && tag == "name" {
                        action_name = Some(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_argument_action_partitions_by_direction() {
        let xml = r#"<?xml version="1.0"?>
<scpd xmlns="urn:dslforum-org:service-1-0">
  <actionList>
    <action>
      <name>X_AVM-DE_SetWPSConfig</name>
      <argumentList>
        <argument>
          <name>NewX_AVM-DE_WPSMode</name>
          <direction>in</direction>
          <relatedStateVariable>X_AVM-DE_WPSMode</relatedStateVariable>
        </argument>
        <argument>
          <name>NewX_AVM-DE_WPSStatus</name>
          <direction>out</direction>
          <relatedStateVariable>X_AVM-DE_WPSStatus</relatedStateVariable>
        </argument>
        <argument>
          <name>NewBogus</name>
          <direction>inout</direction>
        </argument>
      </argumentList>
    </action>
  </actionList>
</scpd>"#;

        let actions = parse_scpd(xml.as_bytes()).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "X_AVM-DE_SetWPSConfig");
        assert_eq!(actions[0].in_args, vec!["NewX_AVM-DE_WPSMode"]);
        assert_eq!(actions[0].out_args, vec!["NewX_AVM-DE_WPSStatus"]);
    }

    #[test]
    fn single_argument_action_parses_like_a_list_of_one() {
        let xml = r#"<?xml version="1.0"?>
<scpd>
  <actionList>
    <action>
      <name>GetEnable</name>
      <argumentList>
        <argument>
          <name>NewEnable</name>
          <direction>out</direction>
        </argument>
      </argumentList>
    </action>
  </actionList>
</scpd>"#;

        let actions = parse_scpd(xml.as_bytes()).unwrap();
        assert_eq!(actions.len(), 1);
        assert!(actions[0].in_args.is_empty());
        assert_eq!(actions[0].out_args, vec!["NewEnable"]);
    }

    #[test]
    fn action_without_argument_list_has_empty_args() {
        let xml = r#"<scpd>
  <actionList>
    <action>
      <name>Reboot</name>
    </action>
  </actionList>
</scpd>"#;

        let actions = parse_scpd(xml.as_bytes()).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "Reboot");
        assert!(actions[0].in_args.is_empty());
        assert!(actions[0].out_args.is_empty());
    }

    #[test]
    fn absent_action_list_yields_empty_registry() {
        let xml = r#"<scpd>
  <serviceStateTable>
    <stateVariable>
      <name>Enable</name>
      <dataType>boolean</dataType>
    </stateVariable>
  </serviceStateTable>
</scpd>"#;

        let actions = parse_scpd(xml.as_bytes()).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn state_variable_names_do_not_leak_into_actions() {
        let xml = r#"<scpd>
  <actionList>
    <action>
      <name>GetInfo</name>
      <argumentList>
        <argument>
          <name>NewStatus</name>
          <direction>out</direction>
        </argument>
      </argumentList>
    </action>
  </actionList>
  <serviceStateTable>
    <stateVariable>
      <name>Status</name>
      <dataType>string</dataType>
    </stateVariable>
  </serviceStateTable>
</scpd>"#;

        let actions = parse_scpd(xml.as_bytes()).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "GetInfo");
        assert_eq!(actions[0].out_args, vec!["NewStatus"]);
    }
}
