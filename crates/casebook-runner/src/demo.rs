//! Bundled demo suite run by the `casebook` binary.

use crate::case;
use crate::case::{CaseError, TestSuite};
use tracing::info;

const GENERALS: [&str; 5] = ["Zhang Fei", "Guan Yu", "Zhao Yun", "Ma Chao", "Huang Zhong"];
const RIVALS: [&str; 5] = ["Zhang Liao", "Zhang He", "Yu Jin", "Yue Jin", "Xu Huang"];

/// Demo suites: one passing, one failing, one erroring and one skipped case
pub fn suites() -> Vec<TestSuite> {
    let demo = TestSuite::new(module_path!(), "DemoSuite")
        .with_doc("title: Demo suite")
        .case(case!(
            test_pass,
            "title: Roll call succeeds\ndescribe: Logs every general and passes\nlevel: 1\ntag: pass,generals",
            {
                for name in GENERALS {
                    info!("{}", name);
                }
                assert!(GENERALS.contains(&"Zhao Yun"), "roll call should include Zhao Yun");
                Ok(())
            }
        ))
        .case(case!(
            test_fail,
            "title: Roll call fails\ndescribe: Logs every rival and fails on purpose\nlevel: 0\ntag: fail,rivals",
            {
                for name in RIVALS {
                    info!("{}", name);
                }
                assert!(RIVALS.contains(&"Zhao Yun"), "intended to fail");
                Ok(())
            }
        ))
        .case(case!(
            test_error,
            "title: Roster file is read\ndescribe: Returns an I/O error when the roster is missing\nlevel: 1\ntag: fail,io",
            {
                let roster = std::fs::read_to_string("casebook-demo-roster.txt")?;
                info!(lines = roster.lines().count(), "Roster loaded");
                Ok(())
            }
        ))
        .case(
            case!(
                test_skip,
                "title: Skipped case\ndescribe: Never runs\nlevel: 2\ntag: skip",
                {
                    Err(CaseError::skip("not ready"))
                }
            )
            .skipped("intended to skip"),
        );

    vec![demo]
}
