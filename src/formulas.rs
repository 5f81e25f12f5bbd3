//! Formula text shared across sheets.
//!
//! Every function returns the formula with its leading `=`. Nothing here
//! evaluates anything; the strings are written into cells verbatim.

/// `=StartingYear+<offset>`.
pub fn year_formula(offset: i64) -> String {
    format!("=StartingYear+{}", offset)
}

/// Select one of twelve month cells by the value of `index_name`.
pub fn choose_month<S: AsRef<str>>(cells: &[S], index_name: &str) -> String {
    let values: Vec<&str> = cells.iter().map(AsRef::as_ref).collect();
    format!("=CHOOSE({},{})", index_name, values.join(","))
}

/// Whole-column structured reference, e.g. `tblTracking[Amount]`.
pub fn column_ref(table: &str, column: &str) -> String {
    format!("{}[{}]", table, column)
}

/// Current-row structured reference, e.g. `tblTracking[[#This Row],[Date]]`.
pub fn this_row_ref(table: &str, column: &str) -> String {
    format!("{}[[#This Row],[{}]]", table, column)
}

/// Sum of tracked amounts of one type whose effective month equals `index_name`.
pub fn monthly_tracking_sumproduct(table: &str, transaction_type: &str, index_name: &str) -> String {
    format!(
        "=SUMPRODUCT((MONTH({})={})*({}=\"{}\")*{})",
        column_ref(table, "Effective Date"),
        index_name,
        column_ref(table, "Type"),
        transaction_type,
        column_ref(table, "Amount")
    )
}

/// Column total between two row-number constants, resolved at calc time.
pub fn section_total_indirect(min_row_name: &str, max_row_name: &str) -> String {
    format!(
        "=SUM(INDIRECT(ADDRESS({},COLUMN()) & \":\" & ADDRESS({},COLUMN())))",
        min_row_name, max_row_name
    )
}

/// Pick the category list matching the transaction type in `type_cell`.
pub fn category_switch(type_cell: &str) -> String {
    format!(
        "=IF({t}=\"Income\",IncomeCats,IF({t}=\"Expense\",ExpenseCats,SavingsCats))",
        t = type_cell
    )
}

/// Header label that gains a check mark once the column balances to zero.
pub fn balanced_label(flag_cell: &str, label: &str) -> String {
    format!(
        "=IF({}=0,\"{} \u{2713}\",\"{}\")",
        flag_cell, label, label
    )
}

/// Running balance up to and including the current row's date.
pub fn running_balance(table: &str) -> String {
    let date = column_ref(table, "Date");
    let this_date = this_row_ref(table, "Date");
    let kind = column_ref(table, "Type");
    let amount = column_ref(table, "Amount");
    format!(
        "=SUMPRODUCT(({date}<={this_date})*({kind}=\"Income\")*{amount})\
         -SUMPRODUCT(({date}<={this_date})*(({kind}=\"Expense\")+({kind}=\"Saving\"))*{amount})"
    )
}

/// Entry date, pushed to the first of next month for late income.
pub fn effective_date(table: &str) -> String {
    let date = this_row_ref(table, "Date");
    let kind = this_row_ref(table, "Type");
    format!(
        "=IF(AND(LateIncomeEnabled,{kind}=\"Income\",DAY({date})>LateIncomeDay),\
         DATE(YEAR({date}),MONTH({date})+1,1),{date})"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_formula() {
        assert_eq!(year_formula(0), "=StartingYear+0");
        assert_eq!(year_formula(4), "=StartingYear+4");
    }

    #[test]
    fn test_choose_month() {
        let cells = ["A1", "B1", "C1"];
        assert_eq!(choose_month(&cells, "MonthIdx"), "=CHOOSE(MonthIdx,A1,B1,C1)");
    }

    #[test]
    fn test_monthly_tracking_sumproduct() {
        assert_eq!(
            monthly_tracking_sumproduct("tblTracking", "Expense", "MonthIdx"),
            "=SUMPRODUCT((MONTH(tblTracking[Effective Date])=MonthIdx)*(tblTracking[Type]=\"Expense\")*tblTracking[Amount])"
        );
    }

    #[test]
    fn test_section_total_indirect() {
        assert_eq!(
            section_total_indirect("income_min_row", "income_max_row"),
            "=SUM(INDIRECT(ADDRESS(income_min_row,COLUMN()) & \":\" & ADDRESS(income_max_row,COLUMN())))"
        );
    }

    #[test]
    fn test_category_switch() {
        assert_eq!(
            category_switch("$D12"),
            "=IF($D12=\"Income\",IncomeCats,IF($D12=\"Expense\",ExpenseCats,SavingsCats))"
        );
    }

    #[test]
    fn test_balanced_label() {
        assert_eq!(balanced_label("E7", "Jan"), "=IF(E7=0,\"Jan \u{2713}\",\"Jan\")");
    }

    #[test]
    fn test_tracking_formulas() {
        assert_eq!(
            running_balance("tblTracking"),
            "=SUMPRODUCT((tblTracking[Date]<=tblTracking[[#This Row],[Date]])*(tblTracking[Type]=\"Income\")*tblTracking[Amount])\
             -SUMPRODUCT((tblTracking[Date]<=tblTracking[[#This Row],[Date]])*((tblTracking[Type]=\"Expense\")+(tblTracking[Type]=\"Saving\"))*tblTracking[Amount])"
        );
        assert_eq!(
            effective_date("tblTracking"),
            "=IF(AND(LateIncomeEnabled,tblTracking[[#This Row],[Type]]=\"Income\",DAY(tblTracking[[#This Row],[Date]])>LateIncomeDay),\
             DATE(YEAR(tblTracking[[#This Row],[Date]]),MONTH(tblTracking[[#This Row],[Date]])+1,1),tblTracking[[#This Row],[Date]])"
        );
    }
}
