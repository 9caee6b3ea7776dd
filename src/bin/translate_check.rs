use repo_query::{
    classify::{QueryOrigin, classify},
    descriptor::{MethodDescriptor, ReturnShape},
    method_name::Keyword,
    translate::{self, Dialect, RelationalBinding},
    value::Value,
};
use strum::IntoEnumIterator;

// A plausible argument for each keyword so every operator gets exercised
fn sample(keyword: Keyword, n: usize) -> Vec<Value> {
    match keyword {
        Keyword::Between => vec![Value::Int(n as i64), Value::Int(n as i64 + 10)],
        Keyword::In | Keyword::NotIn => vec![Value::from(vec!["a", "b"])],
        Keyword::Like | Keyword::NotLike => vec![Value::from("A_a%")],
        Keyword::Matching(_) => vec![Value::from("Ada")],
        _ => vec![Value::Int(n as i64)],
    }
}

fn main() {
    for line in std::io::stdin().lines() {
        let line = line.expect("a line");
        let name = line.trim();
        if name.is_empty() {
            continue;
        }

        let now = std::time::Instant::now();
        let plan = match classify(&MethodDescriptor::new(name, ReturnShape::OrderedList)) {
            Ok(QueryOrigin::DerivedQuery(plan)) => plan,
            Ok(other) => {
                println!("{name}: {} method, nothing to translate", other.kind());
                continue;
            }
            Err(e) => {
                println!("{name}: {e}");
                continue;
            }
        };
        let args: Vec<Value> = plan
            .segments()
            .enumerate()
            .flat_map(|(i, segment)| sample(segment.keyword, i))
            .collect();
        let condition = match plan.instantiate(&args) {
            Ok(condition) => condition,
            Err(e) => {
                println!("{name}: {e}");
                continue;
            }
        };
        println!("{name} [parsed in {}μs]", now.elapsed().as_micros());

        for dialect in
            Dialect::iter().chain([Dialect::Relational(RelationalBinding::Positional)])
        {
            let label = dialect.to_string();
            match translate::translate(dialect, &condition, &[]) {
                Ok(filter) => println!("  {label:>22}: {filter}"),
                Err(e) => println!("  {label:>22}: {e}"),
            }
        }
    }
}
